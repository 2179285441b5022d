use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::panel::tools::error::Result;
use crate::panel::tools::io::excel_write::staging_path;
use crate::panel::tools::rename::HeaderRename;

/// Streams `input` to `output`, passing every header through `rename`.
/// Data records are copied untouched, except that rows shorter than the header
/// are padded with empty fields. The copy is staged next to `output` and only
/// renamed into place once every record has been written.
pub fn rewrite_headers<F>(input: &Path, output: &Path, rename: F) -> Result<Vec<HeaderRename>>
where
    F: Fn(&str) -> String,
{
    let mut reader = ReaderBuilder::new().flexible(true).from_path(input)?;
    let headers = reader.headers()?.clone();

    let mut renames = Vec::new();
    let mut renamed = StringRecord::with_capacity(headers.as_slice().len(), headers.len());
    for (column, header) in headers.iter().enumerate() {
        let new_name = rename(header);
        if new_name != header {
            renames.push(HeaderRename {
                column,
                from: header.to_string(),
                to: new_name.clone(),
            });
        }
        renamed.push_field(&new_name);
    }

    let staging = staging_path(output);
    let copied = copy_records(&mut reader, &staging, &renamed);
    if let Err(error) = copied {
        let _ = fs::remove_file(&staging);
        return Err(error);
    }
    fs::rename(&staging, output)?;

    Ok(renames)
}

fn copy_records(
    reader: &mut csv::Reader<fs::File>,
    path: &Path,
    headers: &StringRecord,
) -> Result<()> {
    let width = headers.len();
    let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
    writer.write_record(headers)?;
    for record in reader.records() {
        let mut record = record?;
        while record.len() < width {
            record.push_field("");
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

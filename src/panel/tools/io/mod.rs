pub mod csv_headers;
pub mod excel_read;
pub mod excel_write;

use std::path::Path;

use crate::panel::tools::error::Result;
use crate::panel::tools::model::Workbook;

/// Loads workbooks by path. The merge engine only talks to this trait so that
/// it stays independent of the spreadsheet library in use.
pub trait WorkbookSource {
    fn load(&self, path: &Path) -> Result<Workbook>;
}

/// Reads `.xlsx`/`.xlsm` files from disk through calamine.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxSource;

impl WorkbookSource for XlsxSource {
    fn load(&self, path: &Path) -> Result<Workbook> {
        excel_read::read_workbook(path)
    }
}

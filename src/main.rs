use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use panel_tools::completeness::{self, GridSpec};
use panel_tools::config::{self, DuplicatePolicy, MergeConfig};
use panel_tools::consolidate::{self, GroupStatus, OverwriteDecision, RunReport};
use panel_tools::io::XlsxSource;
use panel_tools::rename::{self, HeaderRename, TableFormat};
use panel_tools::{Result, ToolError};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing(cli.verbose) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Merge(args) => execute_merge(args),
        Command::Check(args) => execute_check(args),
        Command::Rename(args) => execute_rename(args),
    }
}

fn execute_merge(args: MergeArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let expected = match args.expected_entities {
        Some(count) => count,
        None => prompt_count("Expected number of entities per group (e.g. 8): ")?,
    };
    if expected < 1 {
        return Err(ToolError::InvalidArgument(
            "expected entity count must be at least 1".into(),
        ));
    }

    let plan = consolidate::plan_run(&config)?;
    let existing = plan.existing_outputs();
    let decision = if existing.is_empty() || args.yes {
        OverwriteDecision::Approved
    } else {
        println!("The following output files already exist and will be replaced:");
        for path in &existing {
            println!("   - {}", path.display());
        }
        confirm("Delete them and regenerate everything? (y/N): ")?
    };
    if let Err(err) = consolidate::clear_existing_outputs(&plan, decision) {
        if matches!(err, ToolError::DestructiveOverwriteDeclined { .. }) {
            println!(
                "Cancelled. Remove the files above from {} and run again.",
                config.output_dir.display()
            );
        }
        return Err(err);
    }

    let report = consolidate::execute(&plan, &XlsxSource, &config, expected)?;
    print_merge_report(&report);
    Ok(())
}

fn print_merge_report(report: &RunReport) {
    for outcome in &report.outcomes {
        match &outcome.status {
            GroupStatus::Written { output, appended } => {
                for sheet in appended {
                    let file = sheet
                        .file
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    println!(
                        "{file}  sheet: {}, shape: {} rows x {} columns",
                        sheet.sheet, sheet.rows, sheet.columns
                    );
                }
                println!("written: {}", output.display());
            }
            GroupStatus::Failed(err) => println!("failed: {} ({err})", outcome.key),
        }
    }

    let incomplete: Vec<_> = report.incomplete_coverage().collect();
    if incomplete.is_empty() {
        println!("\nEvery group has the expected number of entities.");
        return;
    }
    println!("\nEntity coverage warnings (outputs are unaffected)");
    println!("==================================================");
    for record in incomplete {
        if !record.missing_entities.is_empty() {
            println!("{} missing entities: {}", record.key, join(&record.missing_entities));
        }
        if !record.unexpected_entities.is_empty() {
            println!(
                "{} entities beyond the expected count: {}",
                record.key,
                join(&record.unexpected_entities)
            );
        }
    }
}

fn execute_check(args: CheckArgs) -> Result<()> {
    let spec = GridSpec {
        country: args.country,
        entity_count: args.entities,
        start_year: args.start_year,
        end_year: args.end_year,
        group_count: args.groups,
        extensions: args
            .extensions
            .as_deref()
            .map(config::parse_extension_list)
            .unwrap_or_else(config::default_extensions),
    };
    let report = completeness::check_directory(&args.dir, &spec)?;

    println!("{}", "=".repeat(60));
    println!("Completeness");
    println!("{}", "=".repeat(60));
    println!("expected files: {}", report.expected_total);
    println!("files present:  {}", report.actual_count);
    println!("missing files:  {}", report.missing.len());
    if report.is_complete() {
        println!("\nNo files missing.");
    } else {
        println!("\nMissing:");
        for stem in &report.missing {
            println!("  - {stem}");
        }
    }
    Ok(())
}

fn execute_rename(args: RenameArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ToolError::MissingInput(args.input));
    }

    match TableFormat::from_path(&args.input)? {
        TableFormat::Xlsx => {
            let renamed = rename::prepare_workbook(&args.input, &XlsxSource)?;
            print_renames(&renamed.renames);
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| renamed.default_output(&args.input));
            gate_single_output(&output, args.yes)?;
            rename::write_renamed_workbook(&output, &renamed)?;
            println!("written: {}", output.display());
        }
        TableFormat::Csv => {
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| rename::renamed_csv_path(&args.input));
            gate_single_output(&output, args.yes)?;
            let renames = rename::rename_csv(&args.input, &output)?;
            print_renames(&renames);
            println!("written: {}", output.display());
        }
    }
    Ok(())
}

fn print_renames(renames: &[HeaderRename]) {
    for item in renames {
        println!("{} → {}", item.from, item.to);
    }
}

fn gate_single_output(output: &Path, yes: bool) -> Result<()> {
    if !output.exists() {
        return Ok(());
    }
    let decision = if yes {
        OverwriteDecision::Approved
    } else {
        confirm(&format!(
            "'{}' already exists. Delete it and generate a new file? (y/N): ",
            output.display()
        ))?
    };
    if decision == OverwriteDecision::Declined {
        return Err(ToolError::DestructiveOverwriteDeclined {
            paths: vec![output.to_path_buf()],
        });
    }
    std::fs::remove_file(output)?;
    println!("removed: {}", output.display());
    Ok(())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(prompt: &str) -> Result<OverwriteDecision> {
    let answer = read_line(prompt)?.to_ascii_lowercase();
    Ok(match answer.as_str() {
        "y" | "yes" => OverwriteDecision::Approved,
        _ => OverwriteDecision::Declined,
    })
}

fn prompt_count(prompt: &str) -> Result<u32> {
    let answer = read_line(prompt)?;
    answer
        .parse()
        .map_err(|_| ToolError::InvalidArgument(format!("'{answer}' is not a whole number")))
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Consolidate per-entity panel workbooks into one workbook per group."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). Defaults to RUST_LOG or info.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge entity files sharing a country, period, and variable group.
    Merge(MergeArgs),
    /// Report which entity × year × group files are missing from a folder.
    Check(CheckArgs),
    /// Rename vendor column headers in an .xlsx or .csv file.
    Rename(RenameArgs),
}

#[derive(clap::Args)]
struct MergeArgs {
    /// JSON configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Folder holding the per-entity workbooks.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Folder receiving the merged workbooks.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Expected number of entities per group; prompted for when omitted.
    #[arg(long)]
    expected_entities: Option<u32>,

    /// Comma separated list of source extensions.
    #[arg(long)]
    extensions: Option<String>,

    /// How to treat two files claiming the same entity number.
    #[arg(long, value_enum)]
    duplicates: Option<DuplicateMode>,

    /// Replace existing outputs without asking.
    #[arg(short, long)]
    yes: bool,
}

impl MergeArgs {
    fn resolve_config(&self) -> Result<MergeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                if !path.exists() {
                    return Err(ToolError::MissingInput(path.clone()));
                }
                MergeConfig::from_json_file(path)?
            }
            None => MergeConfig::default(),
        };
        if let Some(input) = &self.input {
            config.input_dir = input.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(extensions) = &self.extensions {
            config.extensions = config::parse_extension_list(extensions);
        }
        if let Some(mode) = self.duplicates {
            config.duplicate_policy = mode.into();
        }
        Ok(config)
    }
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Folder to inspect.
    #[arg(long)]
    dir: PathBuf,

    /// Country prefix used in the file names, e.g. DE.
    #[arg(long)]
    country: String,

    /// Number of entities (at least 1).
    #[arg(long)]
    entities: u32,

    #[arg(long)]
    start_year: u16,

    #[arg(long)]
    end_year: u16,

    /// Number of variable groups, suffixed A, B, C, ...
    #[arg(long)]
    groups: usize,

    /// Comma separated list of extensions (default xlsx,xlsm).
    #[arg(long)]
    extensions: Option<String>,
}

#[derive(clap::Args)]
struct RenameArgs {
    /// Input .xlsx, .xlsm or .csv file.
    #[arg(long)]
    input: PathBuf,

    /// Output path. Defaults to `<n>countries.xlsx` or `<stem>-renamed.csv`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Replace an existing output without asking.
    #[arg(short, long)]
    yes: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DuplicateMode {
    Warn,
    Reject,
}

impl From<DuplicateMode> for DuplicatePolicy {
    fn from(mode: DuplicateMode) -> Self {
        match mode {
            DuplicateMode::Warn => DuplicatePolicy::Warn,
            DuplicateMode::Reject => DuplicatePolicy::Reject,
        }
    }
}

// tabex CLI - import delimited files to JSON records and export them back

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tabex::{
    app, import, serialize, ConfigService, Delimiter, ExchangeError, ExportSpec, FieldMapping,
    RecordSet, Result, UuidIds,
};

#[derive(Parser)]
#[command(name = "tabex")]
#[command(about = "Exchange tabular data between delimited text files and JSON records")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a delimited file and print the import report as JSON
    #[command(after_help = "\
Examples:
  tabex import products.csv --pretty
  tabex import products.csv --mapping shop.toml --existing catalog.json
  tabex import orders.csv --preset orders")]
    Import {
        /// Delimited input file (UTF-8 or UTF-16 with BOM)
        file: PathBuf,

        /// Mapping profile (TOML); cannot be combined with --preset
        #[arg(long, short = 'm')]
        mapping: Option<PathBuf>,

        /// Built-in column set used when no profile is given
        #[arg(long, short = 'p', value_enum, default_value_t = PresetArg::Products, conflicts_with = "mapping")]
        preset: PresetArg,

        /// JSON array of records already held, used to classify updates
        #[arg(long, short = 'e')]
        existing: Option<PathBuf>,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Serialize a JSON array of records to a delimited file
    #[command(after_help = "\
Examples:
  tabex export catalog.json --out products.csv
  tabex export catalog.json --mapping shop.toml --delimiter semicolon --extras")]
    Export {
        /// JSON array of records
        file: PathBuf,

        /// Mapping profile (TOML); cannot be combined with --preset
        #[arg(long, short = 'm')]
        mapping: Option<PathBuf>,

        /// Built-in column set used when no profile is given
        #[arg(long, short = 'p', value_enum, default_value_t = PresetArg::Products, conflicts_with = "mapping")]
        preset: PresetArg,

        /// Column separator
        #[arg(long, short = 'd', value_enum, default_value_t = DelimiterArg::Comma)]
        delimiter: DelimiterArg,

        /// Append unmapped columns carried on the records
        #[arg(long)]
        extras: bool,

        /// Output file (stdout when omitted)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DelimiterArg {
    Comma,
    Semicolon,
    Tab,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Products,
    Customers,
    Orders,
    Employees,
    Campaigns,
}

impl From<PresetArg> for FieldMapping {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Products => FieldMapping::product_catalog(),
            PresetArg::Customers => FieldMapping::customers(),
            PresetArg::Orders => FieldMapping::orders(),
            PresetArg::Employees => FieldMapping::employees(),
            PresetArg::Campaigns => FieldMapping::campaigns(),
        }
    }
}

impl From<DelimiterArg> for Delimiter {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Comma => Delimiter::Comma,
            DelimiterArg::Semicolon => Delimiter::Semicolon,
            DelimiterArg::Tab => Delimiter::Tab,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    app::init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tabex: {}", e);
            ExitCode::from(1)
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Import {
            file,
            mapping,
            preset,
            existing,
            pretty,
        } => {
            let mapping = load_mapping(mapping.as_deref(), preset)?;
            let existing = match existing {
                Some(path) => read_records(&path)?,
                None => RecordSet::new(),
            };
            let bytes = read_file(&file)?;

            let report = import(&bytes, &mapping, &existing, &mut UuidIds)?;
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            writeln!(io::stdout().lock(), "{}", json)?;
            Ok(())
        }
        Commands::Export {
            file,
            mapping,
            preset,
            delimiter,
            extras,
            out,
        } => {
            let mapping = load_mapping(mapping.as_deref(), preset)?;
            let records = read_records(&file)?;
            let spec = ExportSpec::from_mapping(mapping)
                .with_delimiter(delimiter.into())
                .with_extras(extras);

            let bytes = serialize(records.records(), &spec)?;
            match out {
                Some(path) => fs::write(&path, &bytes).map_err(|e| {
                    ExchangeError::IoError(format!("cannot write {}: {}", path.display(), e))
                })?,
                None => io::stdout().lock().write_all(&bytes)?,
            }
            Ok(())
        }
    }
}

fn load_mapping(path: Option<&Path>, preset: PresetArg) -> Result<FieldMapping> {
    match path {
        Some(path) => ConfigService::load_mapping(path),
        None => Ok(preset.into()),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path)
        .map_err(|e| ExchangeError::IoError(format!("cannot read {}: {}", path.display(), e)))
}

fn read_records(path: &Path) -> Result<RecordSet> {
    let bytes = read_file(path)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        ExchangeError::SerializationError(format!("invalid records in {}: {}", path.display(), e))
    })
}

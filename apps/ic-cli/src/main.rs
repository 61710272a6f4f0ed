use clap::{Args, Parser, Subcommand};
use ic_app::{AppError, AppResult, job_service};
use ic_core::{TimeKey, TimeKind, parse_datetime};
use ic_sowfa::{IcFields, InternalCoupling, Momentum, TimeHeightFields, WriterOptions};
use ic_table::{CsvOptions, FieldTable, load_csv};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "ic-cli")]
#[command(about = "Internal coupling - SOWFA input files from time/height data", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every export of a job file
    Run {
        /// Path to the job YAML/JSON file
        job_path: PathBuf,
    },
    /// Validate job file syntax and dates
    Validate {
        /// Path to the job YAML/JSON file
        job_path: PathBuf,
    },
    /// Summarise a CSV dataset
    Inspect {
        /// Path to the CSV dataset
        csv_path: PathBuf,
        /// Time column holds elapsed seconds instead of timestamps
        #[arg(long)]
        elapsed: bool,
        /// Name of the time column (defaults to the first column)
        #[arg(long)]
        time_column: Option<String>,
    },
    /// Write a surface boundary condition table
    Bcs {
        #[command(flatten)]
        data: DatasetArgs,
        /// Output file name, e.g. qwall
        filename: String,
        /// Field to write
        field: String,
        /// Scale factor applied to the field
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        scale: f64,
    },
    /// Write an initial profile for setFieldsABL
    Ics {
        #[command(flatten)]
        data: DatasetArgs,
        /// Output file name
        filename: String,
        #[arg(long, default_value = "u")]
        xmom: String,
        #[arg(long, default_value = "v")]
        ymom: String,
        #[arg(long, default_value = "theta")]
        temp: String,
    },
    /// Write time-height source tables for ABLProperties
    TimeHeight {
        #[command(flatten)]
        data: DatasetArgs,
        /// Output file name
        filename: String,
        /// Momentum fields as X,Y,Z (all three)
        #[arg(long, value_delimiter = ',', num_args = 3)]
        momentum: Option<Vec<String>>,
        /// Temperature field
        #[arg(long)]
        temp: Option<String>,
    },
}

#[derive(Args)]
struct DatasetArgs {
    /// Path to the CSV dataset
    csv_path: PathBuf,
    /// Directory to write into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
    /// Time column holds elapsed seconds instead of timestamps
    #[arg(long)]
    elapsed: bool,
    /// Name of the time column (defaults to the first column)
    #[arg(long)]
    time_column: Option<String>,
    /// Reference date for solver time zero
    #[arg(long)]
    dateref: Option<String>,
    /// Window start (defaults to the first time)
    #[arg(long)]
    datefrom: Option<String>,
    /// Window end (defaults to the last time)
    #[arg(long)]
    dateto: Option<String>,
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { job_path } => cmd_run(&job_path),
        Commands::Validate { job_path } => cmd_validate(&job_path),
        Commands::Inspect {
            csv_path,
            elapsed,
            time_column,
        } => cmd_inspect(&csv_path, csv_options(elapsed, time_column)),
        Commands::Bcs {
            data,
            filename,
            field,
            scale,
        } => {
            let writer = build_writer(&data)?;
            let path = writer.write_bcs(&filename, &field, scale)?;
            println!("✓ Wrote {}", path.display());
            Ok(())
        }
        Commands::Ics {
            data,
            filename,
            xmom,
            ymom,
            temp,
        } => {
            let writer = build_writer(&data)?;
            let path = writer.write_ics(&filename, &IcFields { xmom, ymom, temp })?;
            println!("✓ Wrote {}", path.display());
            Ok(())
        }
        Commands::TimeHeight {
            data,
            filename,
            momentum,
            temp,
        } => {
            let mut fields = TimeHeightFields::new();
            if let Some(names) = momentum {
                let [x, y, z] = <[String; 3]>::try_from(names).map_err(|given| {
                    AppError::InvalidInput(format!("--momentum needs 3 fields, got {}", given.len()))
                })?;
                fields = fields.with_momentum(Momentum::new(x, y, z));
            }
            if let Some(temp) = temp {
                fields = fields.with_temperature(temp);
            }
            let writer = build_writer(&data)?;
            let path = writer.write_timeheight(&filename, &fields)?;
            println!("✓ Wrote {}", path.display());
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn csv_options(elapsed: bool, time_column: Option<String>) -> CsvOptions {
    CsvOptions {
        time_column,
        time_kind: if elapsed {
            TimeKind::Elapsed
        } else {
            TimeKind::Timestamp
        },
    }
}

fn cmd_run(job_path: &Path) -> AppResult<()> {
    println!("Running job: {}", job_path.display());
    let report = job_service::run_job_file(job_path)?;

    println!("✓ Job '{}' completed", report.name);
    println!("  Window: {} to {}", report.datefrom, report.dateto);
    println!("  Rows: {}", report.rows);
    for export in &report.exports {
        println!("  {} ({}): {}", export.filename, export.kind, export.path.display());
    }
    Ok(())
}

fn cmd_validate(job_path: &Path) -> AppResult<()> {
    println!("Validating job: {}", job_path.display());
    let job = job_service::load_job(job_path)?;
    println!("✓ Job '{}' is valid ({} exports)", job.name, job.exports.len());
    Ok(())
}

fn cmd_inspect(csv_path: &Path, options: CsvOptions) -> AppResult<()> {
    let table = load_csv(csv_path, &options).map_err(|e| AppError::Dataset {
        path: csv_path.to_path_buf(),
        message: e.to_string(),
    })?;
    let summary = job_service::inspect_dataset(&table);

    println!("Dataset: {}", csv_path.display());
    println!("  Rows: {}", summary.rows);
    if let (Some(first), Some(last)) = (summary.first, summary.last) {
        println!("  Time range: {} to {} ({} instants)", first, last, summary.times);
    }
    if let Some(kind) = summary.time_kind {
        println!("  Time kind: {}", kind);
    }
    if summary.heights.is_empty() {
        println!("  Heights: none");
    } else {
        let heights: Vec<String> = summary.heights.iter().map(|z| z.to_string()).collect();
        println!("  Heights: {}", heights.join(", "));
    }
    println!("  Columns:");
    for column in &summary.columns {
        if column.missing > 0 {
            println!("    {} ({} missing)", column.name, column.missing);
        } else {
            println!("    {}", column.name);
        }
    }
    Ok(())
}

fn build_writer(data: &DatasetArgs) -> AppResult<InternalCoupling<FieldTable>> {
    let options = csv_options(data.elapsed, data.time_column.clone());
    let kind = options.time_kind;
    let table = load_csv(&data.csv_path, &options).map_err(|e| AppError::Dataset {
        path: data.csv_path.clone(),
        message: e.to_string(),
    })?;

    let key = |text: &Option<String>| -> AppResult<Option<TimeKey>> {
        Ok(text.as_deref().map(|t| TimeKey::parse(t, kind)).transpose()?)
    };
    let writer_options = WriterOptions {
        dateref: data.dateref.as_deref().map(parse_datetime).transpose()?,
        datefrom: key(&data.datefrom)?,
        dateto: key(&data.dateto)?,
    };

    Ok(InternalCoupling::new(&data.output_dir, &table, writer_options)?)
}

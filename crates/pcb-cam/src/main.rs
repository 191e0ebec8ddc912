use clap::Parser;
use pcb_cam::board::Board;
use pcb_cam::error::CamError;
use pcb_cam::gerber::Units;
use pcb_cam::{export_board, write_files, write_zip_file, ExportOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pcb-cam", about = "Generate Gerber, Excellon and IPC-2581 output from a board")]
struct Cli {
    /// Board JSON file
    input: PathBuf,

    /// Output directory (or zip file with --zip)
    #[arg(short, long, default_value = "cam")]
    output: PathBuf,

    /// Export options JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Units: mm or in
    #[arg(long)]
    units: Option<String>,

    /// Total digits per coordinate (4-9)
    #[arg(long)]
    precision: Option<u8>,

    /// Decimal digits per coordinate
    #[arg(long)]
    decimals: Option<u8>,

    /// Also write an IPC-2581 document
    #[arg(long)]
    ipc2581: bool,

    /// Pack all outputs into one zip archive
    #[arg(long)]
    zip: bool,
}

fn parse_units(s: &str) -> Result<Units, String> {
    match s.to_lowercase().as_str() {
        "mm" | "metric" => Ok(Units::Millimeters),
        "in" | "inch" | "imperial" => Ok(Units::Inches),
        _ => Err(format!("Unknown units: {s}. Use: mm, in")),
    }
}

fn options(cli: &Cli) -> Result<ExportOptions, String> {
    let mut opts = match &cli.config {
        Some(path) => ExportOptions::load(path).map_err(|e| e.to_string())?,
        None => ExportOptions::default(),
    };
    if let Some(units) = &cli.units {
        opts.units = parse_units(units)?;
    }
    if let Some(precision) = cli.precision {
        opts.precision = precision;
    }
    if let Some(decimals) = cli.decimals {
        opts.decimals = decimals;
    }
    opts.ipc2581 |= cli.ipc2581;
    opts.zip |= cli.zip;
    Ok(opts)
}

fn run(cli: &Cli, opts: &ExportOptions) -> Result<usize, CamError> {
    let board = Board::load(&cli.input)?;
    let files = export_board(&board, opts)?;
    if opts.zip {
        write_zip_file(&files, &cli.output)?;
    } else {
        write_files(&files, &cli.output)?;
    }
    Ok(files.len())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let opts = match options(&cli) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match run(&cli, &opts) {
        Ok(count) => {
            log::info!("wrote {count} files to {}", cli.output.display());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

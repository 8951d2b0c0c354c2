use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;

use rowfill::bench::{run_benchmark, BenchmarkArgs};
use rowfill::config::Config;
use rowfill::layout::build_rows;
use rowfill::models::ContentItem;
use rowfill::scanner::{load_ratings, FileScanner, Ratings};

const USAGE: &str = "\
usage: rowfill (--items <file.json> | --scan <dir>) [options]

options:
  --items <file>      JSON array of {id, aspectRatio, rating[, kind]}
  --scan <dir>        build items from the images in a directory
  --ratings <file>    JSON object of item id -> rating (with --scan)
  --row-width <n>     slots per row
  --viewport <name>   use a configured viewport preset (desktop, tablet, mobile)
  --config <file>     config file (default: XDG config dir)
  --pretty            pretty-print the JSON output
  --benchmark         time the layout instead of printing rows
  --runs <n>          benchmark runs (default 1)
  -h, --help          show this help";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    items: Option<PathBuf>,
    scan: Option<PathBuf>,
    ratings: Option<PathBuf>,
    row_width: Option<u32>,
    viewport: Option<String>,
    config: Option<PathBuf>,
    pretty: bool,
    benchmark: bool,
    runs: usize,
    help: bool,
}

fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut cli = CliArgs {
        runs: 1,
        ..Default::default()
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--items" => {
                let value = args.next().context("Missing value for --items")?;
                cli.items = Some(PathBuf::from(value));
            }
            "--scan" => {
                let value = args.next().context("Missing value for --scan")?;
                cli.scan = Some(PathBuf::from(value));
            }
            "--ratings" => {
                let value = args.next().context("Missing value for --ratings")?;
                cli.ratings = Some(PathBuf::from(value));
            }
            "--row-width" => {
                let value = args.next().context("Missing value for --row-width")?;
                let width = value
                    .parse::<u32>()
                    .context("Failed to parse --row-width as a positive integer")?;
                if width == 0 {
                    bail!("--row-width must be greater than 0");
                }
                cli.row_width = Some(width);
            }
            "--viewport" => {
                cli.viewport = Some(args.next().context("Missing value for --viewport")?);
            }
            "--config" => {
                let value = args.next().context("Missing value for --config")?;
                cli.config = Some(PathBuf::from(value));
            }
            "--runs" => {
                let value = args.next().context("Missing value for --runs")?;
                cli.runs = value
                    .parse::<usize>()
                    .context("Failed to parse --runs as a positive integer")?;
            }
            "--pretty" => cli.pretty = true,
            "--benchmark" => cli.benchmark = true,
            "-h" | "--help" => cli.help = true,
            other => bail!("Unknown argument: {}", other),
        }
    }

    if cli.help {
        return Ok(cli);
    }
    if cli.items.is_some() == cli.scan.is_some() {
        bail!("Exactly one of --items or --scan is required");
    }
    if cli.row_width.is_some() && cli.viewport.is_some() {
        bail!("--row-width and --viewport are mutually exclusive");
    }
    if cli.ratings.is_some() && cli.scan.is_none() {
        bail!("--ratings only applies with --scan");
    }
    Ok(cli)
}

fn load_items(cli: &CliArgs, config: &Config) -> Result<Vec<ContentItem>> {
    if let Some(path) = &cli.items {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read items file {:?}", path))?;
        return serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse items file {:?}", path));
    }

    let dir = cli.scan.as_ref().context("No item source given")?;
    let ratings = match &cli.ratings {
        Some(path) => load_ratings(path)?,
        None => Ratings::new(),
    };
    let (items, result) = FileScanner::with_config(config.scan_config()).scan(dir, &ratings)?;
    info!(
        "Scanned {} files ({} collections, {} unreadable)",
        result.total_files, result.collections, result.error_count
    );
    Ok(items)
}

fn resolve_row_width(cli: &CliArgs, config: &Config) -> Result<u32> {
    match (cli.row_width, &cli.viewport) {
        (Some(width), _) => Ok(width),
        (None, Some(viewport)) => config.row_width_for(viewport),
        (None, None) => config.default_row_width(),
    }
}

fn benchmark_widths(cli: &CliArgs, config: &Config) -> Result<Vec<u32>> {
    if cli.row_width.is_some() || cli.viewport.is_some() {
        return Ok(vec![resolve_row_width(cli, config)?]);
    }
    let mut widths: Vec<u32> = config.viewports.values().copied().collect();
    widths.sort_unstable();
    widths.dedup();
    Ok(widths)
}

fn run() -> Result<i32> {
    let cli = parse_args(std::env::args().skip(1))?;
    if cli.help {
        println!("{}", USAGE);
        return Ok(0);
    }

    let config = Config::load(cli.config.as_deref())?;
    let items = load_items(&cli, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.benchmark {
        let args = BenchmarkArgs {
            runs: cli.runs,
            row_widths: benchmark_widths(&cli, &config)?,
        };
        let report = run_benchmark(&items, &args)?;
        writeln!(out, "{}", report.to_json()?).context("Failed to write report")?;
        return Ok(0);
    }

    let row_width = resolve_row_width(&cli, &config)?;
    let rows = build_rows(&items, row_width)?;
    info!("Laid out {} items into {} rows", items.len(), rows.len());

    if cli.pretty {
        serde_json::to_writer_pretty(&mut out, &rows)
    } else {
        serde_json::to_writer(&mut out, &rows)
    }
    .context("Failed to write rows")?;
    writeln!(out).context("Failed to write rows")?;
    Ok(0)
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rowfill=info".parse().unwrap()),
        )
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("rowfill: {:#}", err);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

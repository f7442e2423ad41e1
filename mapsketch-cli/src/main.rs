use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "mapsketch")]
#[command(about = "MapSketch - print-ready map reports from sketch layers")]
#[command(version)]
#[command(long_about = "
MapSketch renders styled map layers into a single-page print report with a
legend, scale, north arrow and total area.

Examples:
  mapsketch render --layers estate.json --out report.pdf --title 'North Estate'
  mapsketch render --layers plots.geojson --out exports/ --format svg
  mapsketch summary --layers estate.json
  mapsketch config --example > mapsketch.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a map report to PDF/SVG/PNG/JSON
    Render {
        /// Layer document or GeoJSON file
        #[arg(long, required = true)]
        layers: PathBuf,

        /// Output file, or a directory to use the suggested file name
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Report title
        #[arg(long)]
        title: Option<String>,

        /// Report subtitle
        #[arg(long)]
        subtitle: Option<String>,

        /// Output format (detected from the extension if not specified)
        #[arg(long)]
        format: Option<RenderFormat>,

        /// Leave out the coordinate grid
        #[arg(long)]
        no_grid: bool,

        /// Leave out polygon labels
        #[arg(long)]
        no_labels: bool,
    },

    /// Print legend rows and the total area
    Summary {
        /// Layer document or GeoJSON file
        #[arg(long, required = true)]
        layers: PathBuf,
    },

    /// Configuration helpers
    Config {
        /// Print an example mapsketch.toml
        #[arg(long)]
        example: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderFormat {
    Pdf,
    Svg,
    Png,
    Json,
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            layers,
            out,
            title,
            subtitle,
            format,
            no_grid,
            no_labels,
        } => {
            let args = commands::render::RenderArgs {
                layers,
                out,
                title,
                subtitle,
                format,
                no_grid,
                no_labels,
            };
            let printed_at = chrono::Local::now().naive_local();
            let written = commands::render::execute(&config, args, printed_at)?;
            if !cli.quiet {
                println!("{}", written.display());
            }
        }

        Commands::Summary { layers } => {
            commands::summary::execute(&layers)?;
        }

        Commands::Config { example } => {
            if example {
                print!("{}", Config::example_toml()?);
            } else {
                print!("{}", toml::to_string_pretty(&config).map_err(CliError::from)?);
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => print_error_and_exit(cli_err),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}

//! hearth CLI: runs the home controller against simulated hardware.

mod console;

use clap::{Parser, Subcommand};
use hearth_controller::setup;
use hearth_types::{ClimateReading, ClothingAdvice};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hearth",
    about = "Home automation controller: lights, gas, intrusion alarm",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the controller with an interactive console.
    Run {
        /// Path to configuration file.
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Validate a configuration file and print the effective settings.
    CheckConfig {
        /// Path to configuration file.
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Print clothing advice for a temperature and humidity.
    Advice {
        /// Temperature in degrees Celsius.
        #[arg(short, long, allow_hyphen_values = true)]
        temperature: f32,
        /// Relative humidity in percent.
        #[arg(short = 'u', long)]
        humidity: f32,
    },
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let config = setup::load_config(config.as_deref())?;
            init_tracing(&config.controller.log_level);
            tracing::info!(mode = %config.controller.startup_mode, "starting hearth");
            console::run(config).await?;
        }
        Commands::CheckConfig { config } => {
            init_tracing("warn");
            let config = setup::load_config(config.as_deref())?;
            print!("{}", toml::to_string_pretty(&config)?);
            println!("# code file: {}", setup::code_file_path(&config).display());
        }
        Commands::Advice {
            temperature,
            humidity,
        } => {
            let reading = ClimateReading {
                temperature_c: temperature,
                humidity_pct: humidity,
            };
            println!("{}", ClothingAdvice::for_reading(reading));
        }
    }

    Ok(())
}

//! Nimbus CLI
//!
//! Thin host over the location and weather backend.

#![allow(clippy::print_stdout)]

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use nimbus_core::{AppError, Config};
use nimbus_weather::{
    ActiveLocationWeather, CitySearch, Location, LocationOrchestrator, StaticCityCatalog,
};

#[derive(Parser)]
#[command(name = "nimbus")]
#[command(author, version, about = "Current weather for your saved locations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest cities matching a name prefix
    Suggest {
        query: String,
    },

    #[command(flatten)]
    Registry(RegistryCommand),
}

/// Commands that need config, the API key and the location store
#[derive(Subcommand)]
enum RegistryCommand {
    /// Show weather for the active location
    Weather,

    /// List saved locations
    Locations,

    /// Save a new location
    Add {
        /// City name, unique within your list
        city: String,

        /// Latitude in degrees
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Remove a saved location
    Remove {
        city: String,
    },

    /// Show weather for a saved location
    Select {
        city: String,
    },

    /// Turn location detection on or off (toggles when omitted)
    Auto {
        #[arg(value_enum)]
        state: Option<Switch>,
    },

    /// Detect the current location from this machine's public IP
    Locate,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    nimbus_core::init()?;

    let cli = Cli::parse();

    let command = match cli.command {
        // Suggestions are local; no config or API key needed
        Commands::Suggest { query } => {
            print_suggestions(&StaticCityCatalog::default(), &query);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Registry(command) => command,
    };

    let (config, _validation) = Config::load_validated()?;
    let api_key = match config.resolve_api_key() {
        Ok(key) => key,
        Err(e) => {
            tracing::error!("{}", e);
            println!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    let orchestrator = match LocationOrchestrator::from_config(&config, &api_key) {
        Ok(orchestrator) => orchestrator,
        Err(e) => return Ok(report(&e)),
    };

    tracing::info!("Nimbus started, store at {:?}", config.store_path());

    match run(&orchestrator, command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => Ok(report(&e)),
    }
}

async fn run(orchestrator: &LocationOrchestrator, command: RegistryCommand) -> Result<(), AppError> {
    match command {
        RegistryCommand::Weather => {
            let active = orchestrator.get_active_location_weather().await?;
            print_weather(active.as_ref());
        }
        RegistryCommand::Locations => {
            print_locations(orchestrator);
        }
        RegistryCommand::Add { city, lat, lon } => {
            let locations = orchestrator
                .add_location(Location::new(city.trim(), lat, lon))
                .await?;
            println!("Saved. You now have {} location(s).", locations.len());
        }
        RegistryCommand::Remove { city } => {
            let locations = orchestrator.remove_location(&city).await?;
            println!("{} location(s) left.", locations.len());
        }
        RegistryCommand::Select { city } => {
            let location = orchestrator.select_location(&city)?;
            let weather = orchestrator.get_weather_for_location(&location).await;
            print_weather(
                weather
                    .map(|weather| ActiveLocationWeather { location, weather })
                    .as_ref(),
            );
        }
        RegistryCommand::Auto { state } => {
            let enabled = match state {
                Some(Switch::On) => orchestrator.set_auto_location_enabled(true).await?,
                Some(Switch::Off) => orchestrator.set_auto_location_enabled(false).await?,
                None => orchestrator.toggle_auto_location().await?,
            };
            println!(
                "Location detection {}",
                if enabled { "on" } else { "off" }
            );
        }
        RegistryCommand::Locate => match orchestrator.resolve_current_location().await {
            Some(location) => println!(
                "{} ({:.4}, {:.4})",
                location.city, location.lat, location.lon
            ),
            None => println!("Current location unavailable"),
        },
    }

    Ok(())
}

/// Print the user-facing message and pick an exit code. Details go to the log.
fn report(err: &AppError) -> ExitCode {
    if err.is_validation() {
        tracing::debug!("Rejected: {}", err);
    } else {
        tracing::error!("{}", err);
    }
    println!("{}", err.user_message());
    ExitCode::FAILURE
}

fn print_weather(active: Option<&ActiveLocationWeather>) {
    let Some(active) = active else {
        println!("--");
        return;
    };

    let weather = &active.weather;
    println!("{}", active.location.city);
    println!("  Now         {}", weather.temperature.long);
    println!("  Feels like  {}", weather.feels_like.short);
    println!(
        "  Low / High  {} / {}",
        weather.min_temperature.short, weather.max_temperature.short
    );
    println!("  Humidity    {}", weather.humidity.formatted);
}

fn print_locations(orchestrator: &LocationOrchestrator) {
    let locations = orchestrator.list_locations();
    if locations.is_empty() {
        println!("No saved locations");
        return;
    }

    for location in locations {
        println!(
            "{}  ({:.4}, {:.4})",
            location.city, location.lat, location.lon
        );
    }
    println!(
        "Location detection: {}",
        if orchestrator.auto_location_enabled() { "on" } else { "off" }
    );
}

fn print_suggestions(search: &dyn CitySearch, query: &str) {
    for location in search.suggest(query) {
        println!(
            "{}  ({:.4}, {:.4})",
            location.city, location.lat, location.lon
        );
    }
}

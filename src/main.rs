//! Splitter Calculator
//!
//! Sizes an auxiliary battery network for a power deficit and shows how to
//! split the fuel line to feed it.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::info;
use tracing_subscriber::EnvFilter;

use splitter_calculator::db::{self, BatteryRecord};
use splitter_calculator::{
    SearchLimits, SearchParams, construct_splitter_network, generate_valid_ratios, import,
    search_with_limits,
};

#[derive(Parser)]
#[command(name = "splitter-calculator")]
#[command(about = "Battery ratio and splitter network calculator")]
struct Cli {
    /// Path to the SQLite battery catalog
    #[arg(short, long, default_value = "splitter_data.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty catalog with schema
    Init,

    /// Load a sample battery catalog
    LoadSample,

    /// Add or replace a battery type
    AddBattery {
        /// Battery ID
        id: String,

        /// Display name
        name: String,

        /// Power output at full duty in watts
        #[arg(short, long)]
        power: f64,

        /// Supply units consumed per second at full duty
        #[arg(short, long, conflicts_with = "duration", required_unless_present = "duration")]
        consume_rate: Option<f64>,

        /// Seconds one supply unit lasts at full duty
        #[arg(long)]
        duration: Option<f64>,

        /// Add without selecting it for searches
        #[arg(long)]
        unselected: bool,
    },

    /// Remove a battery type
    RemoveBattery {
        /// Battery ID
        id: String,
    },

    /// Include a battery type in searches
    Select {
        /// Battery ID
        id: String,
    },

    /// Exclude a battery type from searches
    Deselect {
        /// Battery ID
        id: String,
    },

    /// List all battery types in the catalog
    ListBatteries,

    /// Import battery definitions from a file or directory
    Import {
        /// Definition file, or directory searched for *.batteries files
        path: PathBuf,

        /// Clear existing catalog before import
        #[arg(long)]
        clear: bool,
    },

    /// List the ratios reachable with splitters
    Ratios {
        /// Maximum splitter stages
        #[arg(short, long, default_value = "5")]
        max_depth: u32,
    },

    /// Find battery combinations covering a power target
    Solve {
        /// Total power required in watts
        target: f64,

        /// Power already available in watts
        #[arg(short, long, default_value = "0")]
        base_power: f64,

        /// Fuel supplied on the main line per second
        #[arg(short, long, default_value = "1.0")]
        supply_rate: f64,

        /// Maximum splitter stages per battery
        #[arg(short, long, default_value = "5")]
        max_depth: u32,

        /// Absolute cap on batteries per solution
        #[arg(long, default_value = "8")]
        max_batteries: usize,

        /// Show the splitter network for each solution
        #[arg(short, long)]
        network: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Init => {
            println!("Catalog initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            load_sample_data(&conn)?;
            println!("Sample catalog loaded successfully!");
        }

        Commands::AddBattery {
            id,
            name,
            power,
            consume_rate,
            duration,
            unselected,
        } => {
            let mut battery = match (consume_rate, duration) {
                (Some(rate), _) => BatteryRecord::new(&id, &name, power, rate),
                (None, Some(duration)) if duration > 0.0 => {
                    BatteryRecord::with_duration(&id, &name, power, duration)
                }
                _ => bail!("duration must be greater than zero"),
            };
            battery.selected = !unselected;
            db::upsert_battery(&conn, &battery)?;
            println!("Saved battery '{}'", id);
        }

        Commands::RemoveBattery { id } => {
            if db::remove_battery(&conn, &id)? {
                println!("Removed battery '{}'", id);
            } else {
                println!("Battery '{}' not found", id);
            }
        }

        Commands::Select { id } => update_selection(&conn, &id, true)?,

        Commands::Deselect { id } => update_selection(&conn, &id, false)?,

        Commands::ListBatteries => {
            let batteries = db::list_batteries(&conn)?;
            if batteries.is_empty() {
                println!("No batteries in catalog. Run 'import' or 'load-sample' first.");
            } else {
                println!(
                    "{:<12} {:<24} {:>10} {:>10} {:>10} {:>4}",
                    "ID", "Battery", "Power (W)", "Rate (/s)", "Lasts (s)", "Sel"
                );
                println!("{}", "-".repeat(75));
                for b in batteries {
                    println!(
                        "{:<12} {:<24} {:>10.0} {:>10.4} {:>10.1} {:>4}",
                        b.id,
                        b.name,
                        b.power_watts,
                        b.consume_rate,
                        b.duration(),
                        if b.selected { "*" } else { "" }
                    );
                }
            }
        }

        Commands::Import { path, clear } => {
            if clear {
                println!("Clearing existing catalog...");
                db::clear_batteries(&conn)?;
            }

            let stats = import::import_to_database(&conn, &path)?;
            println!("{}", stats);
        }

        Commands::Ratios { max_depth } => {
            println!("{:<10} {:>12} {:>6}", "Ratio", "Value", "Depth");
            println!("{}", "-".repeat(30));
            for r in generate_valid_ratios(max_depth) {
                println!("{:<10} {:>12.6} {:>6}", r.fraction(), r.value(), r.depth());
            }
        }

        Commands::Solve {
            target,
            base_power,
            supply_rate,
            max_depth,
            max_batteries,
            network,
        } => {
            let params = SearchParams::new(target, base_power, supply_rate, max_depth);
            params.validate()?;

            let battery_types = db::selected_battery_types(&conn)?;
            if battery_types.is_empty() && params.deficit() > 0.0 {
                bail!("No batteries selected. Run 'load-sample' or 'add-battery' first.");
            }

            let limits = SearchLimits {
                max_batteries,
                ..SearchLimits::default()
            };
            info!(
                "solving {:.1}W deficit with {} battery types",
                params.deficit(),
                battery_types.len()
            );

            let solutions = search_with_limits(&params, &battery_types, &limits)?;
            for ranked in &solutions {
                println!("{}", ranked);
                if network {
                    let net = construct_splitter_network(&ranked.solution);
                    println!("Splitter network:\n");
                    println!("{}", net);
                }
            }
        }
    }

    Ok(())
}

fn update_selection(conn: &Connection, id: &str, selected: bool) -> Result<()> {
    if db::set_selected(conn, id, selected)? {
        let state = if selected { "selected" } else { "deselected" };
        println!("Battery '{}' {}", id, state);
    } else {
        println!("Battery '{}' not found", id);
    }
    Ok(())
}

/// Load a small battery catalog for trying the calculator out
fn load_sample_data(conn: &Connection) -> Result<()> {
    db::clear_batteries(conn)?;

    let samples = [
        BatteryRecord::with_duration("fuel-gen", "Fuel Generator", 1100.0, 40.0),
        BatteryRecord::with_duration("steam", "Steam Engine", 800.0, 20.0),
        BatteryRecord::with_duration("biomass", "Biomass Burner", 300.0, 10.0),
        BatteryRecord::with_duration("coal", "Coal Generator", 600.0, 15.0),
    ];
    for battery in &samples {
        db::upsert_battery(conn, battery)?;
    }

    println!("Loaded {} sample batteries", samples.len());
    Ok(())
}

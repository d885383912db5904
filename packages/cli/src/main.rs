#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line tools for the election map.
//!
//! ```text
//! election_map_cli regions [--path data/regions.geojson] [--seed 42] [--json]
//! election_map_cli add-user <username> --role editor [--password ...]
//! election_map_cli users
//! ```
//!
//! Running with no subcommand enters interactive mode. Self-registration
//! through the API only ever creates writers, so editors and admins are
//! provisioned here.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use election_map_auth::local::LocalIdentityProvider;
use election_map_editorial::models::Role;
use election_map_editorial::store::sqlite::DEFAULT_DB_PATH;
use election_map_region::load::DEFAULT_REGIONS_PATH;

#[derive(Parser)]
#[command(
    name = "election_map_cli",
    about = "Inspect region data and manage editorial accounts"
)]
struct Cli {
    /// Editorial database path, or `:memory:`
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a region file and print each region with its statistics
    Regions {
        /// GeoJSON `FeatureCollection` to load
        #[arg(long, default_value = DEFAULT_REGIONS_PATH)]
        path: PathBuf,
        /// Seed for synthesized statistics
        #[arg(long)]
        seed: Option<u64>,
        /// Print the GeoJSON document served by the API instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create an account with any role
    AddUser {
        /// Login name
        username: String,
        /// Account role (writer, editor, admin)
        #[arg(long)]
        role: Role,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// List accounts
    Users,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&cli.db).await;
    };

    match command {
        Commands::Regions { path, seed, json } => {
            print!("{}", commands::regions(&path, seed, json)?);
        }
        Commands::AddUser {
            username,
            role,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => interactive::prompt_password()?,
            };
            let store = election_map_editorial::store::open(&cli.db).await?;
            let identity = LocalIdentityProvider::new(store);
            let user = commands::add_user(&identity, &username, &password, role).await?;
            println!("Created {} ({}) with id {}", user.username, user.role, user.id);
        }
        Commands::Users => {
            let store = election_map_editorial::store::open(&cli.db).await?;
            print!("{}", commands::users(store.as_ref()).await?);
        }
    }

    Ok(())
}

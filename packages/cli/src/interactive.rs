//! Interactive mode, entered when no subcommand is given.

use std::path::PathBuf;

use dialoguer::{Input, Password, Select};
use election_map_auth::local::LocalIdentityProvider;
use election_map_editorial::models::Role;
use election_map_region::load::DEFAULT_REGIONS_PATH;

use crate::commands;

enum Action {
    Regions,
    AddUser,
    Users,
}

impl Action {
    const ALL: &[Self] = &[Self::Regions, Self::AddUser, Self::Users];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Regions => "Summarize regions",
            Self::AddUser => "Add a user",
            Self::Users => "List users",
        }
    }
}

/// Prompts for a password twice.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn prompt_password() -> Result<String, dialoguer::Error> {
    Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
}

/// Asks what to do, then prompts for that action's inputs.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen action fails.
pub async fn run(db: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Election Map");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Regions => {
            let path: String = Input::new()
                .with_prompt("Region file")
                .default(DEFAULT_REGIONS_PATH.to_string())
                .interact_text()?;
            print!("{}", commands::regions(&PathBuf::from(path), None, false)?);
        }
        Action::AddUser => {
            let username: String = Input::new().with_prompt("Username").interact_text()?;

            let roles: Vec<&str> = Role::all().iter().map(|role| role.as_ref()).collect();
            let role_idx = Select::new()
                .with_prompt("Role")
                .items(&roles)
                .default(0)
                .interact()?;

            let password = prompt_password()?;

            let store = election_map_editorial::store::open(db).await?;
            let identity = LocalIdentityProvider::new(store);
            let user =
                commands::add_user(&identity, &username, &password, Role::all()[role_idx]).await?;
            println!("Created {} ({}) with id {}", user.username, user.role, user.id);
        }
        Action::Users => {
            let store = election_map_editorial::store::open(db).await?;
            print!("{}", commands::users(store.as_ref()).await?);
        }
    }

    Ok(())
}

//! Subcommand implementations. Each returns the text to print.

use std::path::Path;

use election_map_auth::{AuthError, IdentityProvider};
use election_map_editorial::models::{Role, User};
use election_map_editorial::store::{EditorialStore, StoreError};
use election_map_region::RegionDataset;
use election_map_region::document::to_feature_collection;
use election_map_region::load::build_dataset;
use rand::SeedableRng as _;
use rand::rngs::StdRng;

/// Loads, normalizes, and annotates the region file at `path`.
///
/// # Errors
///
/// Returns an error if `json` is set and the document cannot be serialized.
pub fn regions(path: &Path, seed: Option<u64>, json: bool) -> Result<String, serde_json::Error> {
    let dataset = match seed {
        Some(seed) => build_dataset(path, &mut StdRng::seed_from_u64(seed)),
        None => build_dataset(path, &mut rand::rng()),
    };

    if json {
        let mut out = serde_json::to_string_pretty(&to_feature_collection(&dataset))?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(format_regions(&dataset))
    }
}

/// Renders one line per region, followed by the dataset bounds.
pub fn format_regions(dataset: &RegionDataset) -> String {
    let mut lines = vec![
        format!(
            "{:<28} {:<8} {:>12} {:>12} {:>8}  WINNER",
            "NAME", "CODE", "REGISTERED", "VALID", "TURNOUT"
        ),
        "-".repeat(90),
    ];

    for region in &dataset.features {
        let code = region.code.as_deref().unwrap_or("-");
        let line = match &region.stats {
            Some(stats) => format!(
                "{:<28} {:<8} {:>12} {:>12} {:>7.2}%  {}",
                region.name_en,
                code,
                stats.registered_voters,
                stats.valid_votes,
                stats.turnout_pct,
                stats.winner
            ),
            None => format!("{:<28} {code:<8}", region.name_en),
        };
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(match dataset.bbox {
        Some(bbox) => format!(
            "{} region(s), bounds {:?}",
            dataset.len(),
            bbox.to_bbox_array()
        ),
        None => format!("{} region(s), no bounds", dataset.len()),
    });

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Creates an account with any role.
///
/// # Errors
///
/// Returns [`AuthError`] if the username or password is rejected, the
/// username is taken, or the store fails.
pub async fn add_user(
    identity: &dyn IdentityProvider,
    username: &str,
    password: &str,
    role: Role,
) -> Result<User, AuthError> {
    let user = identity.register(username, password, role).await?;
    log::info!("Provisioned {} account '{}'", user.role, user.username);
    Ok(user)
}

/// Renders every account, oldest first.
///
/// # Errors
///
/// Returns [`StoreError`] if the accounts cannot be listed.
pub async fn users(store: &dyn EditorialStore) -> Result<String, StoreError> {
    let users = store.list_users().await?;

    if users.is_empty() {
        return Ok("No users found.\n".to_string());
    }

    let mut lines = vec![
        format!("{:<38} {:<24} {:<8} CREATED", "ID", "USERNAME", "ROLE"),
        "-".repeat(100),
    ];
    lines.extend(users.iter().map(|user| {
        format!(
            "{:<38} {:<24} {:<8} {}",
            user.id,
            user.username,
            user.role.as_ref(),
            user.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }));
    lines.push(String::new());
    lines.push(format!("{} user(s)", users.len()));

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

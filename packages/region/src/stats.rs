//! Election statistics attached to each normalized region.
//!
//! Source files rarely carry results, so most figures are generated from an
//! injected random source. Generated numbers are placeholders for map
//! rendering only. When a feature's properties do carry consistent figures
//! (`registered_voters`, `valid_votes`, `winner_party`), those are used
//! instead.

use election_map_region_models::{Party, RegionDataset, RegionStats};
use rand::Rng;
use serde_json::{Map, Value};

/// Smallest generated registered-voter count.
pub const MIN_REGISTERED_VOTERS: u64 = 100_000;

/// Largest generated registered-voter count.
pub const MAX_REGISTERED_VOTERS: u64 = 3_000_000;

/// Attaches statistics to every feature in `dataset`.
#[must_use]
pub fn attach_stats<R: Rng + ?Sized>(mut dataset: RegionDataset, rng: &mut R) -> RegionDataset {
    let mut ingested = 0usize;

    for feature in &mut dataset.features {
        let stats = match stats_from_properties(&feature.properties, rng) {
            Ok(Some(stats)) => {
                ingested += 1;
                stats
            }
            Ok(None) => synthesize(rng),
            Err(message) => {
                log::warn!(
                    "Discarding source figures for region '{}': {message}",
                    feature.name_en
                );
                synthesize(rng)
            }
        };
        feature.stats = Some(stats);
    }

    log::info!(
        "Attached stats to {} regions ({ingested} from source figures)",
        dataset.features.len()
    );

    dataset
}

/// Generates placeholder figures.
///
/// Valid votes are drawn from `[ceil(registered / 2), registered]`, so they
/// never exceed registered voters and never fall below half of them.
pub fn synthesize<R: Rng + ?Sized>(rng: &mut R) -> RegionStats {
    let registered = rng.random_range(MIN_REGISTERED_VOTERS..=MAX_REGISTERED_VOTERS);
    synthesize_for(registered, rng)
}

/// Generates valid votes and a winner for a known registered-voter count.
pub fn synthesize_for<R: Rng + ?Sized>(registered: u64, rng: &mut R) -> RegionStats {
    let valid = rng.random_range(registered.div_ceil(2)..=registered);
    let winner = random_party(rng);

    RegionStats {
        registered_voters: registered,
        valid_votes: valid,
        turnout_pct: election_map_region_models::turnout_pct(registered, valid),
        winner,
    }
}

fn random_party<R: Rng + ?Sized>(rng: &mut R) -> Party {
    let parties = Party::all();
    parties[rng.random_range(0..parties.len())]
}

/// Reads figures already present in the source properties. A missing or
/// unknown `winner_party` is drawn from `rng`.
///
/// Returns `Ok(None)` when both counts are absent, and `Err` when they are
/// partial or unusable.
fn stats_from_properties<R: Rng + ?Sized>(
    props: &Map<String, Value>,
    rng: &mut R,
) -> Result<Option<RegionStats>, String> {
    let (registered, valid) = match (props.get("registered_voters"), props.get("valid_votes")) {
        (None, None) => return Ok(None),
        (Some(registered), Some(valid)) => (registered, valid),
        (Some(_), None) => return Err("registered_voters without valid_votes".to_string()),
        (None, Some(_)) => return Err("valid_votes without registered_voters".to_string()),
    };

    let registered = registered
        .as_u64()
        .ok_or_else(|| format!("registered_voters is not a count: {registered}"))?;
    let valid = valid
        .as_u64()
        .ok_or_else(|| format!("valid_votes is not a count: {valid}"))?;

    let winner = props
        .get("winner_party")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Party>().ok())
        .unwrap_or_else(|| random_party(rng));

    RegionStats::new(registered, valid, winner)
        .map(Some)
        .ok_or_else(|| format!("valid_votes {valid} exceeds registered_voters {registered}"))
}

/// Whether `feature`'s figures satisfy the vote-count invariants.
#[cfg(test)]
fn stats_are_consistent(feature: &election_map_region_models::RegionFeature) -> bool {
    feature.stats.is_some_and(|s| {
        s.valid_votes <= s.registered_voters
            && s.turnout_pct.to_bits()
                == election_map_region_models::turnout_pct(s.registered_voters, s.valid_votes)
                    .to_bits()
    })
}

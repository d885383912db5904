//! Compile-time alias tables for reconciling upstream property names.
//!
//! The table is embedded via `include_str!` and parsed once. Each canonical
//! field has an ordered list of candidate property keys; resolution takes
//! the first populated one.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Embedded alias table.
const ALIASES_TOML: &str = include_str!("../aliases.toml");

static ALIASES: LazyLock<AliasTable> = LazyLock::new(|| {
    toml::de::from_str(ALIASES_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse region alias table: {e}"))
});

/// Returns the process-wide alias table.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse. The table is a compile-time
/// constant, so a failure is a development error caught by the tests below.
#[must_use]
pub fn aliases() -> &'static AliasTable {
    &ALIASES
}

/// Ordered alias candidates for each canonical region field.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasTable {
    /// Candidate keys for the English name.
    pub name_en: Vec<String>,
    /// Candidate keys for the local-script name.
    pub name_am: Vec<String>,
    /// Candidate keys for the identifier code.
    pub code: Vec<CodeAlias>,
    /// Exact-match spelling corrections applied to the English name.
    pub corrections: BTreeMap<String, String>,
}

/// A candidate property key for the identifier code.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeAlias {
    /// Property key.
    pub key: String,
    /// Separator rewrite applied to values read from this key.
    #[serde(default)]
    pub separator: Option<SeparatorRewrite>,
}

/// Replaces one separator string with another.
#[derive(Debug, Clone, Deserialize)]
pub struct SeparatorRewrite {
    /// Separator as it appears in the source.
    pub from: String,
    /// Canonical separator.
    pub to: String,
}

impl AliasTable {
    /// First populated English name, corrected, or `"Unknown"`.
    #[must_use]
    pub fn resolve_name_en(&self, props: &Map<String, Value>) -> String {
        first_populated_str(props, &self.name_en)
            .map_or_else(|| UNKNOWN_NAME.to_string(), |raw| self.canonical_name(raw))
    }

    /// First populated local-script name.
    #[must_use]
    pub fn resolve_name_am(&self, props: &Map<String, Value>) -> Option<String> {
        first_populated_str(props, &self.name_am).map(str::to_string)
    }

    /// First populated identifier code, with the alias's separator rewrite
    /// applied.
    #[must_use]
    pub fn resolve_code(&self, props: &Map<String, Value>) -> Option<String> {
        self.code.iter().find_map(|alias| {
            let raw = match props.get(&alias.key)? {
                Value::String(s) if !s.trim().is_empty() => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };

            Some(match &alias.separator {
                Some(rewrite) => raw.replace(&rewrite.from, &rewrite.to),
                None => raw,
            })
        })
    }

    /// Applies the spelling correction table. Unmapped names pass through.
    #[must_use]
    pub fn canonical_name(&self, raw: &str) -> String {
        self.corrections
            .get(raw)
            .map_or_else(|| raw.to_string(), Clone::clone)
    }
}

/// Name used when no alias is populated.
pub const UNKNOWN_NAME: &str = "Unknown";

/// First key whose value is a non-blank string. The value is returned as
/// stored; blankness is only judged after trimming.
fn first_populated_str<'a>(props: &'a Map<String, Value>, keys: &[String]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        props
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn table_parses() {
        let table = aliases();
        assert!(!table.name_en.is_empty());
        assert!(!table.code.is_empty());
        assert!(!table.corrections.is_empty());
    }

    #[test]
    fn corrections_are_idempotent() {
        let table = aliases();
        for corrected in table.corrections.values() {
            assert!(
                !table.corrections.contains_key(corrected),
                "correction target {corrected:?} is itself corrected"
            );
            assert_eq!(&table.canonical_name(corrected), corrected);
        }
    }

    #[test]
    fn first_populated_alias_wins() {
        let table = aliases();
        let p = props(json!({
            "name_en": "  ",
            "NAME_EN": null,
            "name": "DireDawa",
            "NAME_1": "Something Else",
        }));

        assert_eq!(table.resolve_name_en(&p), "Dire Dawa");
    }

    #[test]
    fn corrections_match_exact_strings_only() {
        let table = aliases();
        let padded = props(json!({ "name_en": " AddisAbeba " }));
        let exact = props(json!({ "name_en": "AddisAbeba" }));

        assert_eq!(table.resolve_name_en(&padded), " AddisAbeba ");
        assert_eq!(table.resolve_name_en(&exact), "Addis Ababa");
    }

    #[test]
    fn non_string_names_are_skipped() {
        let table = aliases();
        let p = props(json!({ "name_en": 42, "NAME_1": "Amhara" }));

        assert_eq!(table.resolve_name_en(&p), "Amhara");
    }

    #[test]
    fn missing_name_is_unknown() {
        let table = aliases();
        assert_eq!(table.resolve_name_en(&Map::new()), UNKNOWN_NAME);
        assert_eq!(table.resolve_name_am(&Map::new()), None);
    }

    #[test]
    fn unmapped_name_passes_through() {
        let table = aliases();
        let p = props(json!({ "name_en": "Sidama" }));

        assert_eq!(table.resolve_name_en(&p), "Sidama");
    }

    #[test]
    fn hasc_code_separator_is_rewritten() {
        let table = aliases();
        let p = props(json!({ "HASC_1": "ET.AA" }));

        assert_eq!(table.resolve_code(&p).as_deref(), Some("ET-AA"));
    }

    #[test]
    fn other_code_aliases_are_unmodified() {
        let table = aliases();
        let p = props(json!({ "ADM1_PCODE": "ET14", "HASC_1": "ET.AA", "code": "ET.AA" }));

        assert_eq!(table.resolve_code(&p).as_deref(), Some("ET.AA"));
    }

    #[test]
    fn numeric_code_is_stringified() {
        let table = aliases();
        let p = props(json!({ "id": 7 }));

        assert_eq!(table.resolve_code(&p).as_deref(), Some("7"));
    }
}

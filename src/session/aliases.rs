//! Speaker alias resolution.
//!
//! Chat display names rarely match the names the persona knows the party
//! members by. The alias table maps a display identity to its canonical
//! party name; anything unmapped passes through unchanged.

use std::collections::HashMap;

/// Display-identity to canonical-identity mapping.
///
/// Rebuilt wholesale on session load/reset. Absent or malformed alias
/// configuration degrades to an empty table; it is never fatal.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Build from the raw `[aliases]` config table.
    ///
    /// Non-string values are skipped with a warning rather than failing the
    /// whole session load.
    pub fn from_toml(table: Option<&toml::Table>) -> Self {
        let mut entries = HashMap::new();
        if let Some(table) = table {
            for (name, value) in table {
                match value.as_str() {
                    Some(canonical) => {
                        entries.insert(name.clone(), canonical.to_string());
                    }
                    None => {
                        tracing::warn!("ignoring alias '{name}': value is not a string");
                    }
                }
            }
        }
        Self { entries }
    }

    /// Resolve a display identity to its canonical identity.
    ///
    /// Returns the input unchanged when no mapping exists.
    pub fn resolve<'a>(&'a self, identity: &'a str) -> &'a str {
        self.entries
            .get(identity)
            .map_or(identity, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_identity() {
        let table = AliasTable::new(HashMap::from([(
            "Jud".to_string(),
            "Jud Lei".to_string(),
        )]));
        assert_eq!(table.resolve("Jud"), "Jud Lei");
    }

    #[test]
    fn unknown_identity_passes_through() {
        let table = AliasTable::default();
        assert_eq!(table.resolve("Eb"), "Eb");
    }

    #[test]
    fn absent_config_degrades_to_empty() {
        let table = AliasTable::from_toml(None);
        assert!(table.is_empty());
    }

    #[test]
    fn non_string_values_are_skipped() {
        let raw: toml::Table = toml::from_str("Jud = \"Jud Lei\"\nbroken = 42").unwrap();
        let table = AliasTable::from_toml(Some(&raw));
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("Jud"), "Jud Lei");
        assert_eq!(table.resolve("broken"), "broken");
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use jarbird_util::errors::{JarbirdError, JarbirdResult};

/// Name of the property files consulted for repository settings.
pub const PROPERTIES_FILE: &str = "jarbird.properties";

/// A flattened key/value lookup for repository settings such as
/// `repository.maven.central.release`.
pub trait PropertySource {
    fn property(&self, key: &str) -> Option<String>;

    /// Like [`property`](Self::property) but fails with the key that was
    /// expected.
    fn require(&self, key: &str) -> JarbirdResult<String> {
        self.property(key)
            .ok_or_else(|| JarbirdError::MissingProperty {
                name: key.to_string(),
            })
    }

    /// Boolean property, `false` unless set to `true` (any case).
    fn flag(&self, key: &str) -> bool {
        self.property(key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}

impl PropertySource for BTreeMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Several property files stacked from most to least specific.
/// The first layer that defines a key wins.
#[derive(Debug, Clone, Default)]
pub struct LayeredProperties {
    layers: Vec<BTreeMap<String, String>>,
}

impl LayeredProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer below the existing ones.
    pub fn push_layer(&mut self, layer: BTreeMap<String, String>) {
        self.layers.push(layer);
    }

    /// Load `jarbird.properties` from each directory, most specific first.
    /// Directories without the file contribute nothing.
    pub fn from_dirs<'a>(dirs: impl IntoIterator<Item = &'a Path>) -> JarbirdResult<Self> {
        let mut props = Self::new();
        for dir in dirs {
            props.push_layer(load_properties_file(&dir.join(PROPERTIES_FILE))?);
        }
        Ok(props)
    }

    /// All layers flattened, first definition winning.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut flat = BTreeMap::new();
        for layer in self.layers.iter().rev() {
            flat.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        flat
    }
}

impl PropertySource for LayeredProperties {
    fn property(&self, key: &str) -> Option<String> {
        let raw = self.layers.iter().find_map(|layer| layer.get(key))?;
        Some(interpolate(raw, &self.flatten()))
    }
}

/// Loads a properties file (`key=value`, `#` or `!` comments).
///
/// A missing file yields an empty map.
pub fn load_properties_file(path: &Path) -> JarbirdResult<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    if !path.is_file() {
        return Ok(map);
    }
    let content = std::fs::read_to_string(path)?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        } else {
            tracing::warn!("ignoring malformed line in {}: {trimmed}", path.display());
        }
    }
    Ok(map)
}

/// Interpolate `${env:VAR}` references in a string.
///
/// Looks up values first from `overrides`, then from the process
/// environment. Unknown references expand to nothing.
pub fn interpolate(input: &str, overrides: &BTreeMap<String, String>) -> String {
    let mut result = input.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${env:") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let end = start + end;
        let key = &result[start + 6..end];
        let value = overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
            .unwrap_or_default();
        result.replace_range(start..=end, &value);
        from = start + value.len();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn first_layer_wins() {
        let mut props = LayeredProperties::new();
        props.push_layer(layer(&[("a", "module")]));
        props.push_layer(layer(&[("a", "root"), ("b", "root")]));
        assert_eq!(props.property("a").as_deref(), Some("module"));
        assert_eq!(props.property("b").as_deref(), Some("root"));
        assert_eq!(props.property("c"), None);
    }

    #[test]
    fn require_reports_key() {
        let props = LayeredProperties::new();
        let err = props.require("repository.maven.x.release").unwrap_err();
        match err {
            JarbirdError::MissingProperty { name } => {
                assert_eq!(name, "repository.maven.x.release")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn flag_parses_true_only() {
        let props = layer(&[("x", "TRUE"), ("y", "yes")]);
        assert!(props.flag("x"));
        assert!(!props.flag("y"));
        assert!(!props.flag("z"));
    }

    #[test]
    fn interpolates_from_other_properties() {
        let mut props = LayeredProperties::new();
        props.push_layer(layer(&[("user", "${env:JARBIRD_TEST_USER_NAME}")]));
        props.push_layer(layer(&[("JARBIRD_TEST_USER_NAME", "alice")]));
        assert_eq!(props.property("user").as_deref(), Some("alice"));
    }

    #[test]
    fn self_referencing_value_does_not_loop() {
        let overrides = layer(&[("A", "${env:A}")]);
        assert_eq!(interpolate("x=${env:A}", &overrides), "x=${env:A}");
    }
}

//! `pom.yaml` fragments.
//!
//! A fragment file holds one or more YAML documents. A document with a
//! `variant` key only applies to publications of that variant; documents
//! without one apply to every publication.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use jarbird_core::descriptor::{Descriptor, Overlay};
use jarbird_util::errors::{JarbirdError, JarbirdResult};

/// File names searched for fragments, in order.
pub const FRAGMENT_FILES: &[&str] = &["pom.yaml", "pom.yml"];

/// All documents of one fragment file, indexed by variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentGroup {
    default: Descriptor,
    variants: BTreeMap<String, Descriptor>,
}

impl FragmentGroup {
    /// A group holding a single variant-independent fragment.
    pub fn single(fragment: Descriptor) -> Self {
        let mut group = Self::default();
        group.add(fragment);
        group
    }

    /// Add a document. Earlier documents take precedence over later ones
    /// for the same variant.
    pub fn add(&mut self, fragment: Descriptor) {
        let slot = if fragment.variant.is_empty() {
            &mut self.default
        } else {
            self.variants.entry(fragment.variant.clone()).or_default()
        };
        fragment.overlay_to(slot);
        if slot.variant.is_empty() {
            slot.variant = fragment.variant;
        }
    }

    pub fn parse(content: &str) -> JarbirdResult<Self> {
        let mut group = Self::default();
        for document in serde_yaml::Deserializer::from_str(content) {
            let value = serde_yaml::Value::deserialize(document).map_err(descriptor_error)?;
            if value.is_null() {
                continue;
            }
            let fragment: Descriptor = serde_yaml::from_value(value).map_err(descriptor_error)?;
            group.add(fragment);
        }
        Ok(group)
    }

    /// Load a fragment file. A missing file is an empty group.
    pub fn load(path: &Path) -> JarbirdResult<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            JarbirdError::Descriptor { message } => JarbirdError::Descriptor {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    /// Load the first fragment file found in `dir`.
    pub fn load_dir(dir: &Path) -> JarbirdResult<Self> {
        match jarbird_util::fs::first_existing(dir, FRAGMENT_FILES) {
            Some(path) => {
                tracing::debug!("loading descriptor fragment {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// The fragment that applies to `variant`: the variant's own document
    /// overlaid with the shared one.
    pub fn for_variant(&self, variant: &str) -> Descriptor {
        let mut fragment = self.variants.get(variant).cloned().unwrap_or_default();
        self.default.overlay_to(&mut fragment);
        fragment
    }

    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.default == Descriptor::default() && self.variants.is_empty()
    }
}

fn descriptor_error(e: serde_yaml::Error) -> JarbirdError {
    JarbirdError::Descriptor {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_documents() {
        let group = FragmentGroup::parse(
            "group: io.hkhc\nartifactId: lib\n---\nvariant: jre8\ndescription: for jre8\n",
        )
        .unwrap();
        let jre8 = group.for_variant("jre8");
        assert_eq!(jre8.group, "io.hkhc");
        assert_eq!(jre8.description, "for jre8");

        let plain = group.for_variant("");
        assert_eq!(plain.group, "io.hkhc");
        assert!(plain.description.is_empty());
        assert_eq!(group.variants().collect::<Vec<_>>(), vec!["jre8"]);
    }

    #[test]
    fn variant_document_wins_over_shared() {
        let group = FragmentGroup::parse(
            "version: '1.0'\n---\nvariant: beta\nversion: 2.0-beta\n",
        )
        .unwrap();
        assert_eq!(group.for_variant("beta").version, "2.0-beta");
        assert_eq!(group.for_variant("other").version, "1.0");
    }

    #[test]
    fn integer_version_is_read_as_text() {
        let group = FragmentGroup::parse("version: 2\n").unwrap();
        assert_eq!(group.for_variant("").version, "2");
        let group = FragmentGroup::parse("version: \"1.10\"\n").unwrap();
        assert_eq!(group.for_variant("").version, "1.10");
    }

    #[test]
    fn unquoted_decimal_version_is_rejected() {
        for content in ["version: 1.10\n", "version: 1.0\n"] {
            match FragmentGroup::parse(content).unwrap_err() {
                JarbirdError::Descriptor { message } => {
                    assert!(message.contains("quote it"), "{message}")
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn empty_and_comment_only_content() {
        assert!(FragmentGroup::parse("").unwrap().is_empty());
        assert!(FragmentGroup::parse("# nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn malformed_yaml_is_descriptor_error() {
        let err = FragmentGroup::parse("licenses: 42\n").unwrap_err();
        assert!(matches!(err, JarbirdError::Descriptor { .. }), "got: {err}");
    }
}

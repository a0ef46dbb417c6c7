use super::DatatypeOracle;
use crate::error::DatatypesError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;

/// Extension-to-class lookup tables, in the shape the datatypes registry
/// publishes them.
///
/// `ext_to_class_name` maps an extension (`"tabular"`) to its datatype class
/// name, and `class_to_classes` maps each class to the set of classes it is
/// an instance of (itself included).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DatatypesMapping {
    #[serde(default)]
    pub ext_to_class_name: AHashMap<String, String>,
    #[serde(default)]
    pub class_to_classes: AHashMap<String, AHashMap<String, bool>>,
}

/// The full registry payload, with the mapping nested under `datatypes_mapping`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TypesAndMapping {
    #[serde(default)]
    pub datatypes: Vec<String>,
    pub datatypes_mapping: DatatypesMapping,
}

impl DatatypesMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `extension` as an instance of `class_name`, which itself
    /// derives from each class in `ancestors`.
    pub fn with_datatype(mut self, extension: &str, class_name: &str, ancestors: &[&str]) -> Self {
        self.ext_to_class_name
            .insert(extension.to_string(), class_name.to_string());
        let classes = self
            .class_to_classes
            .entry(class_name.to_string())
            .or_default();
        classes.insert(class_name.to_string(), true);
        for ancestor in ancestors {
            classes.insert((*ancestor).to_string(), true);
        }
        self
    }

    /// Parses a bare mapping, or a full registry payload carrying one under
    /// `datatypes_mapping`.
    pub fn from_json(json: &str) -> Result<Self, DatatypesError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| DatatypesError::JsonParseError(e.to_string()))?;
        if value.get("datatypes_mapping").is_some() {
            let payload: TypesAndMapping = serde_json::from_value(value)
                .map_err(|e| DatatypesError::JsonParseError(e.to_string()))?;
            Ok(payload.datatypes_mapping)
        } else {
            serde_json::from_value(value).map_err(|e| DatatypesError::JsonParseError(e.to_string()))
        }
    }

    /// Loads a mapping from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, DatatypesError> {
        let content = fs::read_to_string(path).map_err(|e| DatatypesError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn knows(&self, extension: &str) -> bool {
        self.ext_to_class_name.contains_key(extension)
    }
}

impl DatatypeOracle for DatatypesMapping {
    fn is_subtype(&self, candidate: &str, required: &str) -> bool {
        let (Some(child), Some(parent)) = (
            self.ext_to_class_name.get(candidate),
            self.ext_to_class_name.get(required),
        ) else {
            return false;
        };
        if child == parent {
            return true;
        }
        self.class_to_classes
            .get(child)
            .and_then(|ancestors| ancestors.get(parent))
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> DatatypesMapping {
        DatatypesMapping::new()
            .with_datatype("data", "Data", &[])
            .with_datatype("txt", "Text", &["Data"])
            .with_datatype("tabular", "Tabular", &["Text", "Data"])
    }

    #[test]
    fn subtype_follows_class_ancestry() {
        let m = mapping();
        assert!(m.is_subtype("tabular", "txt"));
        assert!(m.is_subtype("tabular", "data"));
        assert!(!m.is_subtype("txt", "tabular"));
    }

    #[test]
    fn unknown_extensions_fail_closed() {
        let m = mapping();
        assert!(!m.is_subtype("mystery", "data"));
        assert!(!m.is_subtype("txt", "mystery"));
    }

    #[test]
    fn parses_registry_payload() {
        let json = r#"{
            "datatypes": ["txt", "tabular"],
            "datatypes_mapping": {
                "ext_to_class_name": {"txt": "Text", "tabular": "Tabular"},
                "class_to_classes": {"Tabular": {"Tabular": true, "Text": true}}
            }
        }"#;
        let m = DatatypesMapping::from_json(json).unwrap();
        assert!(m.is_subtype("tabular", "txt"));
    }

    #[test]
    fn parses_bare_mapping() {
        let json = r#"{"ext_to_class_name": {"txt": "Text"}}"#;
        let m = DatatypesMapping::from_json(json).unwrap();
        assert!(m.knows("txt"));
        assert!(DatatypesMapping::from_json("not json").is_err());
    }
}

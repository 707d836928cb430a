use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One implementation of a capability, contributed by a single load unit.
///
/// Wire field names match the generated fragment payloads, which predate this
/// crate and cannot change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct ImplementorRecord {
    /// Sanitized display markup for the implementation header.
    #[serde(rename = "text")]
    pub display_markup: String,
    /// Canonical identifier of the implementing type.
    #[serde(rename = "target", default)]
    pub target_type: String,
    /// True for compiler-generated implementations (auto and blanket impls).
    #[serde(rename = "synthetic", default)]
    pub is_synthetic: bool,
    /// Canonical paths of every type participating in the implementation, in
    /// source order. The first entry names the implementing type.
    #[serde(rename = "types", default)]
    pub type_identifiers: Vec<String>,
}

impl ImplementorRecord {
    pub fn new(display_markup: impl Into<String>, type_identifiers: Vec<String>) -> Self {
        let mut record = Self {
            display_markup: display_markup.into(),
            target_type: String::new(),
            is_synthetic: false,
            type_identifiers,
        };
        record.normalize();
        record
    }

    /// Derives a missing `target_type` from the first type identifier.
    pub fn normalize(&mut self) {
        if self.target_type.is_empty() {
            if let Some(first) = self.type_identifiers.first() {
                self.target_type = first.clone();
            }
        }
    }

    /// Shape constraints a record must satisfy after normalization.
    pub(crate) fn check(&self) -> Result<(), &'static str> {
        if self.display_markup.trim().is_empty() {
            return Err("display markup must not be empty");
        }
        if self.target_type.is_empty() {
            return Err("record names no implementing type");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generated_payload_shape() {
        let json = r#"{
            "text": "impl Resource for <a class=\"struct\">Account</a>",
            "synthetic": false,
            "types": ["bank::Account"]
        }"#;
        let mut record: ImplementorRecord = serde_json::from_str(json).unwrap();
        record.normalize();

        assert_eq!(record.target_type, "bank::Account");
        assert!(!record.is_synthetic);
        assert!(record.check().is_ok());
    }

    #[test]
    fn test_missing_markup_is_rejected() {
        let json = r#"{"synthetic": true, "types": ["x::Y"]}"#;
        assert!(serde_json::from_str::<ImplementorRecord>(json).is_err());
    }

    #[test]
    fn test_record_without_types_fails_check() {
        let record = ImplementorRecord::new("impl Foo for Bar", Vec::new());
        assert_eq!(record.check(), Err("record names no implementing type"));
    }
}

//! Flow Feature Record - one already-extracted network-connection observation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logic::error::{DetectionError, EngineResult};

/// Names of the fields every record must carry
pub const REQUIRED_FIELDS: &[&str] = &["duration", "protocol_type", "service", "flag"];

/// Value of an additional record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// Input to one classification; constructed per request, consumed once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowFeatureRecord {
    pub duration: u64,
    pub protocol_type: String,
    pub service: String,
    pub flag: String,

    /// Any further numeric/categorical fields (src_bytes, logged_in, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl FlowFeatureRecord {
    pub fn new(duration: u64, protocol_type: &str, service: &str, flag: &str) -> Self {
        Self {
            duration,
            protocol_type: protocol_type.to_string(),
            service: service.to_string(),
            flag: flag.to_string(),
            extra: BTreeMap::new(),
        }
    }

    /// Builder-style helper for additional fields
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.extra.insert(name.to_string(), value.into());
        self
    }

    /// Reject malformed records before they reach a classifier
    pub fn validate(&self) -> EngineResult<()> {
        for (name, value) in [
            ("protocol_type", &self.protocol_type),
            ("service", &self.service),
            ("flag", &self.flag),
        ] {
            if value.trim().is_empty() {
                return Err(DetectionError::InvalidInput(format!("field '{}' is empty", name)));
            }
        }

        for (name, value) in &self.extra {
            if name.trim().is_empty() {
                return Err(DetectionError::InvalidInput("empty field name".to_string()));
            }
            if REQUIRED_FIELDS.contains(&name.as_str()) {
                return Err(DetectionError::InvalidInput(format!(
                    "field '{}' given twice",
                    name
                )));
            }
            match value {
                FieldValue::Number(v) if !v.is_finite() => {
                    return Err(DetectionError::InvalidInput(format!(
                        "field '{}' is not a finite number",
                        name
                    )));
                }
                FieldValue::Text(s) if s.trim().is_empty() => {
                    return Err(DetectionError::InvalidInput(format!("field '{}' is empty", name)));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Expand into `(column, value)` pairs
    ///
    /// Numeric and boolean fields keep their name; categorical fields become a
    /// single indicator column `field=value` set to 1.
    pub fn expanded_columns(&self) -> Vec<(String, f32)> {
        let mut columns = Vec::with_capacity(4 + self.extra.len());

        columns.push(("duration".to_string(), self.duration as f32));
        columns.push((indicator("protocol_type", &self.protocol_type), 1.0));
        columns.push((indicator("service", &self.service), 1.0));
        columns.push((indicator("flag", &self.flag), 1.0));

        for (name, value) in &self.extra {
            match value {
                FieldValue::Number(v) => columns.push((name.clone(), *v as f32)),
                FieldValue::Bool(b) => columns.push((name.clone(), if *b { 1.0 } else { 0.0 })),
                FieldValue::Text(s) => columns.push((indicator(name, s), 1.0)),
            }
        }

        columns
    }
}

/// Indicator column name for a categorical value
pub fn indicator(field: &str, value: &str) -> String {
    format!("{}={}", field, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_extra_fields() {
        let json = r#"{"duration":0,"protocol_type":"tcp","service":"http","flag":"SF",
                       "src_bytes":181,"logged_in":true,"land":"0"}"#;
        let record: FlowFeatureRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.duration, 0);
        assert_eq!(record.protocol_type, "tcp");
        assert_eq!(record.extra.get("src_bytes"), Some(&FieldValue::Number(181.0)));
        assert_eq!(record.extra.get("logged_in"), Some(&FieldValue::Bool(true)));
        assert_eq!(record.extra.get("land"), Some(&FieldValue::Text("0".into())));
    }

    #[test]
    fn test_missing_required_field_fails_to_parse() {
        let json = r#"{"duration":0,"protocol_type":"tcp","service":"http"}"#;
        assert!(serde_json::from_str::<FlowFeatureRecord>(json).is_err());
    }

    #[test]
    fn test_negative_duration_fails_to_parse() {
        let json = r#"{"duration":-1,"protocol_type":"tcp","service":"http","flag":"SF"}"#;
        assert!(serde_json::from_str::<FlowFeatureRecord>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_categorical() {
        let record = FlowFeatureRecord::new(0, "  ", "http", "SF");
        let err = record.validate().unwrap_err();
        assert!(matches!(err, DetectionError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_non_finite_numbers() {
        let record = FlowFeatureRecord::new(0, "tcp", "http", "SF").with_field("src_bytes", f64::NAN);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_text_extra() {
        let record = FlowFeatureRecord::new(0, "tcp", "http", "SF").with_field("land", " ");
        let err = record.validate().unwrap_err();
        assert!(matches!(err, DetectionError::InvalidInput(_)));

        let ok = FlowFeatureRecord::new(0, "tcp", "http", "SF").with_field("land", "0");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_expanded_columns() {
        let record = FlowFeatureRecord::new(12, "udp", "domain_u", "SF")
            .with_field("src_bytes", 45.0)
            .with_field("is_guest_login", false);

        let columns = record.expanded_columns();
        assert!(columns.contains(&("duration".to_string(), 12.0)));
        assert!(columns.contains(&("protocol_type=udp".to_string(), 1.0)));
        assert!(columns.contains(&("service=domain_u".to_string(), 1.0)));
        assert!(columns.contains(&("flag=SF".to_string(), 1.0)));
        assert!(columns.contains(&("src_bytes".to_string(), 45.0)));
        assert!(columns.contains(&("is_guest_login".to_string(), 0.0)));
    }
}

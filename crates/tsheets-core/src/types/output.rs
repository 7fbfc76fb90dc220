//! Shape in which successful responses are handed back to callers

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output format for successful API responses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Nested key-ordered maps and sequences (default)
    #[default]
    AssociativeMap,
    /// Structured object with path accessors
    TypedObject,
    /// Body returned untouched
    RawText,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::AssociativeMap => write!(f, "associative_map"),
            OutputFormat::TypedObject => write!(f, "typed_object"),
            OutputFormat::RawText => write!(f, "raw_text"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "associative_map" | "map" | "assoc" => Ok(OutputFormat::AssociativeMap),
            "typed_object" | "object" => Ok(OutputFormat::TypedObject),
            "raw_text" | "raw" => Ok(OutputFormat::RawText),
            other => Err(Error::Config(format!(
                "Invalid output format '{other}', expected one of associative_map, typed_object, raw_text"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!("map".parse::<OutputFormat>().unwrap(), OutputFormat::AssociativeMap);
        assert_eq!("Typed_Object".parse::<OutputFormat>().unwrap(), OutputFormat::TypedObject);
        assert_eq!(" raw ".parse::<OutputFormat>().unwrap(), OutputFormat::RawText);
        assert_eq!(OutputFormat::default(), OutputFormat::AssociativeMap);
    }

    #[test]
    fn test_invalid_output_format_fails() {
        let err = "xml".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("xml")));
    }

    #[test]
    fn test_display_round_trips() {
        for format in [OutputFormat::AssociativeMap, OutputFormat::TypedObject, OutputFormat::RawText] {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
    }
}

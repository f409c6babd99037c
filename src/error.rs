//! Error types for the garden designer
//!
//! Recoverable failures surface as [`GardenError`]. Window and GPU setup paths
//! use `anyhow` instead, since they only ever bubble up to the startup screen.

use thiserror::Error;

/// Errors raised by item creation, placement and save handling
#[derive(Debug, Error)]
pub enum GardenError {
    /// Category string did not name any known item family
    #[error("unknown item type: {0}")]
    UnknownItemType(String),

    /// Category is known but the subtype is not one of its variants
    #[error("unknown {category} subtype: {subtype}")]
    UnknownSubtype { category: String, subtype: String },

    /// Save payload has no `state` record
    #[error("invalid save data: missing state")]
    MissingState,

    /// Save payload was written by an incompatible format version
    #[error("unsupported save version: {0}")]
    UnsupportedVersion(String),

    #[error("save data could not be parsed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Placement point lies outside the garden boundary
    #[error("position ({x:.2}, {z:.2}) is outside the garden")]
    OutOfBounds { x: f32, z: f32 },

    #[error("no tool selected")]
    NoToolSelected,

    /// An item with this id is already in the garden
    #[error("item {0} is already placed")]
    DuplicateItem(String),

    #[error("render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, GardenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = GardenError::UnknownItemType("spaceship".into());
        assert_eq!(err.to_string(), "unknown item type: spaceship");

        let err = GardenError::UnknownSubtype {
            category: "tree".into(),
            subtype: "palm".into(),
        };
        assert_eq!(err.to_string(), "unknown tree subtype: palm");
    }

    #[test]
    fn test_json_errors_convert() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: GardenError = parse.unwrap_err().into();
        assert!(matches!(err, GardenError::Serialization(_)));
    }
}

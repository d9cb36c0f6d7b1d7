//! Error types for binding setup
//!
//! Only setup-time failures are values. An unknown tag reaching the decoder
//! means both sides were compiled from different definitions and aborts
//! instead of producing an error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing bindings or loading configuration
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A static type with no boundary tag
    #[error("type not supported across the boundary: {type_name}")]
    UnsupportedType { type_name: String },

    /// Fields of an exposed composite whose types have no boundary tag
    #[error("{owner} has fields with unsupported types: {}", describe_fields(.fields))]
    UnsupportedFields {
        owner: String,
        fields: Vec<UnmappedField>,
    },

    /// Member count or index would not fit the native `int` fields
    #[error("{owner} has {count} members, more than native metadata can describe")]
    TooManyMembers { owner: String, count: usize },

    /// Configuration file could not be read or written
    #[error("failed to access config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::Config`]
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be rendered back to TOML
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

impl BridgeError {
    /// Build an unsupported-type error from a resolver descriptor name
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// True for the two unsupported-mapping variants
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType { .. } | Self::UnsupportedFields { .. }
        )
    }

    /// Every rejected field, in declaration order (empty for other errors)
    pub fn unsupported_fields(&self) -> &[UnmappedField] {
        match self {
            Self::UnsupportedFields { fields, .. } => fields,
            _ => &[],
        }
    }
}

/// One composite field with no boundary tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedField {
    pub field: String,
    pub type_name: String,
}

fn describe_fields(fields: &[UnmappedField]) -> String {
    fields
        .iter()
        .map(|f| format!("'{}' ({})", f.field, f.type_name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, BridgeError>;

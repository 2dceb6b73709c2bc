//! Input validation limits for node and edge creation
//!
//! Validation runs before the store touches its backend, so a rejected
//! request never leaves a partial write behind.

use crate::edge::NewEdge;
use crate::node::NewNode;
use crate::property::PropertyValue;

/// Maximum length for node and edge types (128 bytes)
pub const MAX_TYPE_LEN: usize = 128;

/// Maximum length for node labels (1KB)
pub const MAX_LABEL_LEN: usize = 1024;

/// Maximum length for a property key (256 bytes)
pub const MAX_PROPERTY_KEY_LEN: usize = 256;

/// Maximum properties per node (256)
pub const MAX_PROPERTIES_PER_NODE: usize = 256;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField { field: &'static str },
    FieldTooLong { field: &'static str, len: usize, max: usize },
    InvalidType { value: String },
    EmptyPropertyKey,
    PropertyKeyTooLong { len: usize, max: usize },
    TooManyProperties { count: usize, max: usize },
    NonFiniteWeight { weight: f64 },
    NonFiniteProperty { key: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "{} is required and cannot be empty", field),
            Self::FieldTooLong { field, len, max } => {
                write!(f, "{} too long: {} bytes (max {})", field, len, max)
            }
            Self::InvalidType { value } => {
                write!(f, "Type {:?} contains a NUL character", value)
            }
            Self::EmptyPropertyKey => write!(f, "Property keys cannot be empty"),
            Self::PropertyKeyTooLong { len, max } => {
                write!(f, "Property key too long: {} bytes (max {})", len, max)
            }
            Self::TooManyProperties { count, max } => {
                write!(f, "Too many properties: {} (max {})", count, max)
            }
            Self::NonFiniteWeight { weight } => {
                write!(f, "Edge weight must be a finite number, got {}", weight)
            }
            Self::NonFiniteProperty { key } => {
                write!(f, "Property {:?} contains a non-finite number", key)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn validate_required(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    if value.len() > max {
        return Err(ValidationError::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

/// Validate a node or edge type
pub fn validate_type(field: &'static str, value: &str) -> Result<(), ValidationError> {
    validate_required(field, value, MAX_TYPE_LEN)?;
    // NUL separates the type from the id in on-disk index keys
    if value.contains('\0') {
        return Err(ValidationError::InvalidType {
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Floats at any depth must be finite; JSON has no encoding for NaN or infinity
fn is_finite_value(value: &PropertyValue) -> bool {
    match value {
        PropertyValue::Float(f) => f.is_finite(),
        PropertyValue::List(items) => items.iter().all(is_finite_value),
        PropertyValue::Map(map) => map.values().all(is_finite_value),
        _ => true,
    }
}

/// Validate a node label
pub fn validate_label(label: &str) -> Result<(), ValidationError> {
    validate_required("label", label, MAX_LABEL_LEN)
}

/// Validate a new node before it is stored
pub fn validate_new_node(node: &NewNode) -> Result<(), ValidationError> {
    validate_type("type", &node.node_type)?;
    validate_label(&node.label)?;

    if let Some(properties) = &node.properties {
        if properties.len() > MAX_PROPERTIES_PER_NODE {
            return Err(ValidationError::TooManyProperties {
                count: properties.len(),
                max: MAX_PROPERTIES_PER_NODE,
            });
        }
        for (key, value) in properties {
            if key.is_empty() {
                return Err(ValidationError::EmptyPropertyKey);
            }
            if key.len() > MAX_PROPERTY_KEY_LEN {
                return Err(ValidationError::PropertyKeyTooLong {
                    len: key.len(),
                    max: MAX_PROPERTY_KEY_LEN,
                });
            }
            if !is_finite_value(value) {
                return Err(ValidationError::NonFiniteProperty { key: key.clone() });
            }
        }
    }
    Ok(())
}

/// Validate a new edge before its endpoints are checked
pub fn validate_new_edge(edge: &NewEdge) -> Result<(), ValidationError> {
    validate_type("type", &edge.edge_type)?;
    if let Some(weight) = edge.weight {
        if !weight.is_finite() {
            return Err(ValidationError::NonFiniteWeight { weight });
        }
    }
    Ok(())
}

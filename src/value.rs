//! Typed values exchanged with the host engine.
//!
//! The host's argument/result marshaling is modeled as a small capability:
//! read a typed argument, return a typed result. Each accessor verifies the
//! declared host-side type before any interpretation happens, so a mismatch
//! is reported before a single handle or buffer has been allocated.

use crate::error::{ChemError, Result};

/// A host-level value: the only currency crossing the function boundary.
///
/// Ownership of returned `Text`/`Blob` payloads transfers to the host, which
/// is responsible for their eventual release.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit signed integer.
    Integer(i64),
    /// A double-precision float.
    Double(f64),
    /// A text string (molecular or pattern notation).
    Text(String),
    /// A byte blob (structure pickle or packed fingerprint).
    Blob(Vec<u8>),
    /// The host's NULL.
    Null,
}

impl Value {
    /// Host-level type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Null => "null",
        }
    }

    /// Read this value as an integer, or fail with `TypeMismatch`.
    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(v) => Ok(*v),
            _ => Err(ChemError::TypeMismatch("integer")),
        }
    }

    /// Read this value as a double, or fail with `TypeMismatch`.
    pub fn as_double(&self) -> Result<f64> {
        match self {
            Value::Double(v) => Ok(*v),
            _ => Err(ChemError::TypeMismatch("double")),
        }
    }

    /// Read this value as text, or fail with `TypeMismatch`.
    pub fn as_text(&self) -> Result<&str> {
        match self {
            Value::Text(s) => Ok(s.as_str()),
            _ => Err(ChemError::TypeMismatch("text")),
        }
    }

    /// Read this value as a blob, or fail with `TypeMismatch`.
    pub fn as_blob(&self) -> Result<&[u8]> {
        match self {
            Value::Blob(b) => Ok(b.as_slice()),
            _ => Err(ChemError::TypeMismatch("blob")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_their_variant() {
        assert_eq!(Value::Integer(7).as_integer().unwrap(), 7);
        assert_eq!(Value::Text("CCO".into()).as_text().unwrap(), "CCO");
        assert_eq!(Value::Blob(vec![1, 2]).as_blob().unwrap(), &[1, 2][..]);
    }

    #[test]
    fn wrong_variant_is_a_type_mismatch() {
        let err = Value::Text("CCO".into()).as_blob().unwrap_err();
        assert!(matches!(err, ChemError::TypeMismatch("blob")));
        let err = Value::Null.as_integer().unwrap_err();
        assert!(matches!(err, ChemError::TypeMismatch("integer")));
    }
}

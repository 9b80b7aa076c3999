//! Typed access to HCL bodies.
//!
//! Both the contexts file and the cluster configuration are HCL documents
//! made of labelled blocks with a small set of attributes. These helpers turn
//! the generic `hcl::Body` tree into checked values with precise errors.

use hcl::{Attribute, Block, Body, Expression};
use thiserror::Error;

/// Structural problem in an HCL document.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The text is not valid HCL
    #[error("{0}")]
    Syntax(#[from] hcl::Error),

    /// A block has the wrong number of labels
    #[error("block '{block}' expects {expected} label(s), found {found}")]
    Labels {
        /// Block identifier
        block: String,
        /// Expected label count
        expected: usize,
        /// Actual label count
        found: usize,
    },

    /// A label is empty
    #[error("block '{0}' has an empty label")]
    EmptyLabel(String),

    /// An attribute the block does not support
    #[error("unsupported argument '{name}' in '{block}'")]
    UnknownAttribute {
        /// Enclosing block description
        block: String,
        /// Attribute name
        name: String,
    },

    /// A nested block the block does not support
    #[error("unsupported block type '{name}' in '{block}'")]
    UnknownBlock {
        /// Enclosing block description
        block: String,
        /// Nested block identifier
        name: String,
    },

    /// A required attribute is absent
    #[error("missing required argument '{name}' in '{block}'")]
    MissingAttribute {
        /// Enclosing block description
        block: String,
        /// Attribute name
        name: String,
    },

    /// An attribute has the wrong value type
    #[error("argument '{name}' must be {expected}")]
    AttributeType {
        /// Attribute name
        name: String,
        /// Expected type description
        expected: &'static str,
    },
}

/// Parse HCL text into a body.
pub fn parse(src: &str) -> Result<Body, SchemaError> {
    Ok(hcl::parse(src)?)
}

/// Return the single, non-empty label of a block.
pub fn single_label(block: &Block) -> Result<&str, SchemaError> {
    match block.labels() {
        [label] if label.as_str().is_empty() => {
            Err(SchemaError::EmptyLabel(block.identifier().to_string()))
        }
        [label] => Ok(label.as_str()),
        labels => Err(SchemaError::Labels {
            block: block.identifier().to_string(),
            expected: 1,
            found: labels.len(),
        }),
    }
}

/// Reject nested blocks whose identifier is not in `allowed`.
pub fn check_blocks(body: &Body, scope: &str, allowed: &[&str]) -> Result<(), SchemaError> {
    for block in body.blocks() {
        if !allowed.contains(&block.identifier()) {
            return Err(SchemaError::UnknownBlock {
                block: scope.to_string(),
                name: block.identifier().to_string(),
            });
        }
    }
    Ok(())
}

/// Reject attributes whose key is not in `allowed`.
pub fn check_attributes(body: &Body, scope: &str, allowed: &[&str]) -> Result<(), SchemaError> {
    for attr in body.attributes() {
        if !allowed.contains(&attr.key()) {
            return Err(SchemaError::UnknownAttribute {
                block: scope.to_string(),
                name: attr.key().to_string(),
            });
        }
    }
    Ok(())
}

/// Find an attribute by key.
pub fn attribute<'a>(body: &'a Body, key: &str) -> Option<&'a Attribute> {
    body.attributes().find(|attr| attr.key() == key)
}

/// Read an optional string attribute.
pub fn optional_string(body: &Body, key: &str) -> Result<Option<String>, SchemaError> {
    attribute(body, key).map(as_string).transpose()
}

/// Read a required string attribute.
pub fn required_string(body: &Body, key: &str, scope: &str) -> Result<String, SchemaError> {
    optional_string(body, key)?.ok_or_else(|| SchemaError::MissingAttribute {
        block: scope.to_string(),
        name: key.to_string(),
    })
}

/// Read an optional boolean attribute.
pub fn optional_bool(body: &Body, key: &str) -> Result<Option<bool>, SchemaError> {
    attribute(body, key)
        .map(|attr| match attr.expr() {
            Expression::Bool(b) => Ok(*b),
            _ => Err(type_error(attr, "a bool")),
        })
        .transpose()
}

/// Read an optional list-of-strings attribute.
pub fn optional_string_list(body: &Body, key: &str) -> Result<Option<Vec<String>>, SchemaError> {
    attribute(body, key)
        .map(|attr| match attr.expr() {
            Expression::Array(items) => items
                .iter()
                .map(|item| match item {
                    Expression::String(s) => Ok(s.clone()),
                    _ => Err(type_error(attr, "a list of strings")),
                })
                .collect(),
            _ => Err(type_error(attr, "a list of strings")),
        })
        .transpose()
}

fn as_string(attr: &Attribute) -> Result<String, SchemaError> {
    match attr.expr() {
        Expression::String(s) => Ok(s.clone()),
        _ => Err(type_error(attr, "a string")),
    }
}

fn type_error(attr: &Attribute, expected: &'static str) -> SchemaError {
    SchemaError::AttributeType {
        name: attr.key().to_string(),
        expected,
    }
}

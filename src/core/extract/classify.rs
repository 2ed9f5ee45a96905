//! Node-definition classification.
//!
//! A class is a node definition when its own body declares the input
//! descriptor method or an output-types sequence literal. Both checks look at
//! direct class-body statements only.

use crate::core::parsers::python::{ClassDef, FunctionDef, Stmt};

use super::{INPUT_METHOD, OUTPUT_TYPES_ATTR};

pub fn find_method<'a>(class: &'a ClassDef, name: &str) -> Option<&'a FunctionDef> {
    class.body.iter().find_map(|stmt| match stmt {
        Stmt::Function(method) if method.name == name => Some(method),
        _ => None,
    })
}

pub fn has_method_named(class: &ClassDef, name: &str) -> bool {
    find_method(class, name).is_some()
}

/// True when `name` is assigned a tuple or list literal.
pub fn has_sequence_attribute(class: &ClassDef, name: &str) -> bool {
    class.body.iter().any(|stmt| {
        matches!(stmt, Stmt::Assign { targets, value }
            if targets.iter().any(|t| t == name) && value.as_sequence().is_some())
    })
}

pub fn is_node_class(class: &ClassDef) -> bool {
    has_method_named(class, INPUT_METHOD) || has_sequence_attribute(class, OUTPUT_TYPES_ATTR)
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type classifier.
//!
//! Maps rosidl primitive names onto the scalar types of the declaration
//! grammar and picks the typed-array alternative offered for numeric arrays.

use crate::generate::GenerateError;
use crate::idl::{FieldType, InterfaceType};
use crate::validate::InterfaceRole;
use std::fmt;

/// Subfolder used for message references by default.
pub const DEFAULT_SUB_FOLDER: &str = "msg";

/// Scalar type a primitive maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Number,
    Boolean,
    Text,
}

impl ScalarKind {
    /// Name in the declaration grammar.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Text => "string",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a primitive type name; `None` when the name is not a primitive.
pub fn classify_primitive(type_name: &str) -> Option<ScalarKind> {
    let kind = match type_name {
        "char" | "byte" | "octet" | "short" | "long" | "long long" | "unsigned short"
        | "unsigned long" | "unsigned long long" | "float" | "double" | "long double" | "int8"
        | "int16" | "int32" | "int64" | "uint8" | "uint16" | "uint32" | "uint64" | "float32"
        | "float64" => ScalarKind::Number,
        "bool" | "boolean" => ScalarKind::Boolean,
        "string" | "wstring" => ScalarKind::Text,
        _ => return None,
    };
    Some(kind)
}

/// Fixed-width array alternative for a numeric primitive.
///
/// 64-bit integers have none.
pub fn typed_array_name(type_name: &str) -> Option<&'static str> {
    match type_name {
        "byte" | "octet" | "uint8" => Some("Uint8Array"),
        "char" | "int8" => Some("Int8Array"),
        "short" | "int16" => Some("Int16Array"),
        "unsigned short" | "uint16" => Some("Uint16Array"),
        "long" | "int32" => Some("Int32Array"),
        "unsigned long" | "uint32" => Some("Uint32Array"),
        "float" | "float32" => Some("Float32Array"),
        "double" | "float64" => Some("Float64Array"),
        _ => None,
    }
}

fn resolve_primitive(field_type: &FieldType) -> Result<ScalarKind, GenerateError> {
    classify_primitive(&field_type.type_name).ok_or_else(|| GenerateError::UnresolvedType {
        type_name: field_type.type_name.clone(),
        interface: field_type.owner_interface.clone(),
    })
}

/// Declared type of a constant.
pub fn constant_type(field_type: &FieldType) -> Result<ScalarKind, GenerateError> {
    resolve_primitive(field_type)
}

/// Declared type of a field of `interface`, array suffix included
/// (`number[] | Uint8Array`, `geometry_msgs.msg.Point[]`).
pub fn field_type_name(
    field_type: &FieldType,
    interface: &InterfaceType,
    role: InterfaceRole,
) -> Result<String, GenerateError> {
    let scalar = if field_type.is_primitive {
        Some(resolve_primitive(field_type)?)
    } else {
        None
    };

    let mut declared = match scalar {
        Some(kind) => kind.as_str().to_string(),
        None => {
            let package = field_type
                .owner_package
                .as_deref()
                .unwrap_or(&interface.package);
            let sub_folder = if role.uses_own_sub_folder() && package == interface.package {
                interface.sub_folder.as_str()
            } else {
                DEFAULT_SUB_FOLDER
            };
            format!("{}.{}.{}", package, sub_folder, field_type.type_name)
        }
    };

    if field_type.is_array {
        declared.push_str("[]");
        if scalar == Some(ScalarKind::Number) {
            if let Some(alternate) = typed_array_name(&field_type.type_name) {
                declared.push_str(" | ");
                declared.push_str(alternate);
            }
        }
    }

    Ok(declared)
}

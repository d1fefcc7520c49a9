// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Parser for rosidl message bodies (`.msg` and the blocks of `.srv`/`.action`).
//!
//! ```text
//! # comment
//! int32 FOO=1                  constant
//! string<=16 label "default"   field with default
//! geometry_msgs/Point[<=8] pts bounded sequence of a message
//! ```

use super::{
    ConstantDescriptor, FieldDescriptor, FieldType, InterfaceType, LoadError, MessageDescriptor,
};
use std::path::Path;

/// Unqualified type resolved outside the declaring package.
const HEADER_TYPE: &str = "Header";
const HEADER_PACKAGE: &str = "std_msgs";

/// Parse a message body declared by `interface`.
pub fn parse_message(
    interface: InterfaceType,
    body: &str,
    path: &Path,
) -> Result<MessageDescriptor, LoadError> {
    let mut message = MessageDescriptor::new(interface);

    for (index, raw_line) in body.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        parse_line(&mut message, line).map_err(|message| LoadError::Syntax {
            path: path.to_path_buf(),
            line: index + 1,
            message,
        })?;
    }

    Ok(message)
}

fn parse_line(message: &mut MessageDescriptor, line: &str) -> Result<(), String> {
    let (type_token, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("missing name after type '{line}'"))?;
    let rest = rest.trim();
    let mut field_type = parse_type(type_token, &message.interface.package)?;
    field_type.owner_interface = message.interface.full_name();

    if let Some((name, value)) = split_constant(rest) {
        if !field_type.is_primitive || field_type.is_array {
            return Err(format!(
                "constant '{name}' must have a primitive non-array type"
            ));
        }
        message.constants.push(ConstantDescriptor {
            name: name.to_string(),
            field_type,
            value: value.to_string(),
        });
        return Ok(());
    }

    let (name, default_value) = match rest.split_once(char::is_whitespace) {
        Some((name, default)) => (name, Some(default.trim().to_string())),
        None => (rest, None),
    };
    if !is_identifier(name) {
        return Err(format!("invalid field name '{name}'"));
    }

    message.fields.push(FieldDescriptor {
        name: name.to_string(),
        field_type,
        default_value: default_value.filter(|d| !d.is_empty()),
    });
    Ok(())
}

/// `NAME=value` with an identifier on the left.
fn split_constant(rest: &str) -> Option<(&str, &str)> {
    let (name, value) = rest.split_once('=')?;
    let name = name.trim();
    is_identifier(name).then(|| (name, value.trim()))
}

/// Parse a type token such as `int32`, `string<=8`, `pkg/Type[<=4]`.
pub fn parse_type(token: &str, package: &str) -> Result<FieldType, String> {
    let (base, array) = match token.find('[') {
        Some(open) => {
            let inner = token[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| format!("unterminated array in '{token}'"))?;
            (&token[..open], Some(inner))
        }
        None => (token, None),
    };

    let (base, string_bound) = match base.split_once("<=") {
        Some((base, bound)) => (base, Some(parse_bound(bound, token)?)),
        None => (base, None),
    };
    if base.is_empty() {
        return Err(format!("missing type in '{token}'"));
    }

    let mut field_type = if base.starts_with(|c: char| c.is_ascii_lowercase()) && !base.contains('/')
    {
        FieldType::primitive(base)
    } else {
        let segments: Vec<&str> = base.split('/').collect();
        match segments.as_slice() {
            [name] if *name == HEADER_TYPE => FieldType::message(HEADER_PACKAGE, *name),
            [name] => FieldType::message(package, *name),
            [pkg, name] | [pkg, _, name] if !pkg.is_empty() && !name.is_empty() => {
                FieldType::message(*pkg, *name)
            }
            _ => return Err(format!("invalid type '{base}'")),
        }
    };
    if string_bound.is_some() && !field_type.is_primitive {
        return Err(format!("only strings can be bounded, got '{token}'"));
    }
    field_type.string_bound = string_bound;

    Ok(match array {
        None => field_type,
        Some("") => field_type.unbounded_array(),
        Some(bound) => match bound.strip_prefix("<=") {
            Some(upper) => field_type.bounded_array(parse_bound(upper, token)?),
            None => field_type.fixed_array(parse_bound(bound, token)?),
        },
    })
}

fn parse_bound(bound: &str, token: &str) -> Result<u32, String> {
    bound
        .trim()
        .parse()
        .map_err(|_| format!("invalid bound '{bound}' in '{token}'"))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Drop a trailing `#` comment that is not inside a quoted literal.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match (quote, c) {
            (None, '#') => return &line[..i],
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
    }
    line
}

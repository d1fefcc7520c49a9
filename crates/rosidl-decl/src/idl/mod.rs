// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interface descriptors.
//!
//! A loaded interface is one of three shapes (message, service, action),
//! decided once by the loader. Services and actions carry their parts only
//! when the source body split into the expected number of blocks.

pub mod loader;
pub mod parser;

pub use loader::{load_packages, DescriptorLoader, IdlFileLoader, PackageDescriptors, SubFolder};
pub use parser::parse_message;

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Descriptor loading errors.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Fully qualified interface name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InterfaceType {
    pub package: String,
    pub sub_folder: String,
    pub name: String,
}

impl InterfaceType {
    pub fn new(
        package: impl Into<String>,
        sub_folder: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            sub_folder: sub_folder.into(),
            name: name.into(),
        }
    }

    /// Sibling type in the same package and subfolder.
    pub fn sibling(&self, suffix: &str) -> Self {
        Self::new(
            self.package.clone(),
            self.sub_folder.clone(),
            format!("{}{}", self.name, suffix),
        )
    }

    /// `<package>/<subfolder>/<name>`
    pub fn full_name(&self) -> String {
        format!("{}/{}/{}", self.package, self.sub_folder, self.name)
    }

    /// `<package>.<subfolder>.<name>`
    pub fn namespace_path(&self) -> String {
        format!("{}.{}.{}", self.package, self.sub_folder, self.name)
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.package, self.sub_folder, self.name)
    }
}

/// Declared type of a field or constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldType {
    /// Base type name without array or string bounds (`int32`, `Pose`).
    pub type_name: String,
    pub is_primitive: bool,
    pub is_array: bool,
    /// Fixed size, or upper bound when `is_upper_bound` is set.
    pub array_bound: Option<u32>,
    pub is_upper_bound: bool,
    /// Upper bound of a bounded `string`/`wstring`.
    pub string_bound: Option<u32>,
    /// Package defining a non-primitive type.
    pub owner_package: Option<String>,
    /// Interface declaring the field (`<package>/<subfolder>/<name>`).
    pub owner_interface: String,
}

impl FieldType {
    /// Primitive scalar type.
    pub fn primitive(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            is_primitive: true,
            is_array: false,
            array_bound: None,
            is_upper_bound: false,
            string_bound: None,
            owner_package: None,
            owner_interface: String::new(),
        }
    }

    /// Reference to a message type of `package`.
    pub fn message(package: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            is_primitive: false,
            owner_package: Some(package.into()),
            ..Self::primitive(type_name)
        }
    }

    /// Unbounded sequence of this type.
    #[must_use]
    pub fn unbounded_array(mut self) -> Self {
        self.is_array = true;
        self.array_bound = None;
        self.is_upper_bound = false;
        self
    }

    /// Fixed-size array of this type.
    #[must_use]
    pub fn fixed_array(mut self, size: u32) -> Self {
        self.is_array = true;
        self.array_bound = Some(size);
        self.is_upper_bound = false;
        self
    }

    /// Bounded sequence of this type.
    #[must_use]
    pub fn bounded_array(mut self, bound: u32) -> Self {
        self.is_array = true;
        self.array_bound = Some(bound);
        self.is_upper_bound = true;
        self
    }
}

/// A message field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub default_value: Option<String>,
}

/// A message constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDescriptor {
    pub interface: InterfaceType,
    pub fields: Vec<FieldDescriptor>,
    pub constants: Vec<ConstantDescriptor>,
}

impl MessageDescriptor {
    pub fn new(interface: InterfaceType) -> Self {
        Self {
            interface,
            fields: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Append a field declared by this message.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, mut field_type: FieldType) -> Self {
        field_type.owner_interface = self.interface.full_name();
        self.fields.push(FieldDescriptor {
            name: name.into(),
            field_type,
            default_value: None,
        });
        self
    }

    /// Append a constant declared by this message.
    #[must_use]
    pub fn with_constant(
        mut self,
        name: impl Into<String>,
        mut field_type: FieldType,
        value: impl Into<String>,
    ) -> Self {
        field_type.owner_interface = self.interface.full_name();
        self.constants.push(ConstantDescriptor {
            name: name.into(),
            field_type,
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceParts {
    pub request: MessageDescriptor,
    pub response: MessageDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub interface: InterfaceType,
    /// `None` when the body did not split into request and response.
    pub parts: Option<ServiceParts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionParts {
    pub goal: MessageDescriptor,
    pub result: MessageDescriptor,
    pub feedback: MessageDescriptor,
    pub feedback_message: MessageDescriptor,
    pub send_goal: ServiceDescriptor,
    pub get_result: ServiceDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub interface: InterfaceType,
    /// `None` when the body did not split into goal, result and feedback.
    pub parts: Option<Box<ActionParts>>,
}

/// A loaded interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InterfaceDescriptor {
    Message(MessageDescriptor),
    Service(ServiceDescriptor),
    Action(ActionDescriptor),
}

impl InterfaceDescriptor {
    pub fn interface(&self) -> &InterfaceType {
        match self {
            Self::Message(m) => &m.interface,
            Self::Service(s) => &s.interface,
            Self::Action(a) => &a.interface,
        }
    }

    /// Interface name without package and subfolder.
    pub fn name(&self) -> &str {
        &self.interface().name
    }

    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceDescriptor> {
        match self {
            Self::Service(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_action(&self) -> Option<&ActionDescriptor> {
        match self {
            Self::Action(a) => Some(a),
            _ => None,
        }
    }
}

impl From<MessageDescriptor> for InterfaceDescriptor {
    fn from(value: MessageDescriptor) -> Self {
        Self::Message(value)
    }
}

impl From<ServiceDescriptor> for InterfaceDescriptor {
    fn from(value: ServiceDescriptor) -> Self {
        Self::Service(value)
    }
}

impl From<ActionDescriptor> for InterfaceDescriptor {
    fn from(value: ActionDescriptor) -> Self {
        Self::Action(value)
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor loading.
//!
//! Turns discovered references into descriptors and groups them per package
//! and subfolder, preserving discovery order.

use super::parser::parse_message;
use super::{
    ActionDescriptor, ActionParts, FieldType, InterfaceDescriptor, InterfaceType, LoadError,
    MessageDescriptor, ServiceDescriptor, ServiceParts,
};
use crate::model::{InterfaceCategory, InterfaceReference, PackageMap};
use crate::splitter::{split_blocks, REQUEST_SUFFIX, RESPONSE_SUFFIX};
use serde::Serialize;
use std::path::Path;

pub const GOAL_SUFFIX: &str = "_Goal";
pub const RESULT_SUFFIX: &str = "_Result";
pub const FEEDBACK_SUFFIX: &str = "_Feedback";
pub const FEEDBACK_MESSAGE_SUFFIX: &str = "_FeedbackMessage";
pub const SEND_GOAL_SUFFIX: &str = "_SendGoal";
pub const GET_RESULT_SUFFIX: &str = "_GetResult";
pub const EVENT_SUFFIX: &str = "_Event";

/// Turns one reference into the descriptors it declares.
///
/// A service or action may expand into several sibling descriptors; the
/// first returned descriptor is always the referenced interface itself.
pub trait DescriptorLoader: Send + Sync {
    fn load(&self, reference: &InterfaceReference) -> Result<Vec<InterfaceDescriptor>, LoadError>;
}

/// Loader for rosidl `.msg`, `.srv` and `.action` text files.
#[derive(Debug, Clone, Default)]
pub struct IdlFileLoader {
    service_events: bool,
}

impl IdlFileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also produce a `<Service>_Event` message for every service.
    pub fn with_service_events(mut self, enabled: bool) -> Self {
        self.service_events = enabled;
        self
    }

    fn load_service(
        &self,
        interface: InterfaceType,
        body: &str,
        path: &Path,
    ) -> Result<Vec<InterfaceDescriptor>, LoadError> {
        let service = build_service(interface, body, path)?;
        let mut descriptors = Vec::with_capacity(2);
        if self.service_events && service.parts.is_some() {
            descriptors.push(service_event(&service.interface));
        }
        descriptors.insert(0, service.into());
        Ok(descriptors)
    }

    fn load_action(
        &self,
        interface: InterfaceType,
        body: &str,
        path: &Path,
    ) -> Result<Vec<InterfaceDescriptor>, LoadError> {
        let blocks = split_blocks(body);
        let [goal, result, feedback] = blocks.as_slice() else {
            tracing::debug!(
                "{} splits into {} block(s), loading it without parts",
                interface,
                blocks.len()
            );
            return Ok(vec![ActionDescriptor {
                interface,
                parts: None,
            }
            .into()]);
        };

        let goal = parse_message(interface.sibling(GOAL_SUFFIX), goal, path)?;
        let result = parse_message(interface.sibling(RESULT_SUFFIX), result, path)?;
        let feedback = parse_message(interface.sibling(FEEDBACK_SUFFIX), feedback, path)?;

        let package = interface.package.as_str();
        let local =
            |suffix: &str| FieldType::message(package, format!("{}{}", interface.name, suffix));

        let feedback_message = MessageDescriptor::new(interface.sibling(FEEDBACK_MESSAGE_SUFFIX))
            .with_field("goal_id", goal_id_type())
            .with_field("feedback", local(FEEDBACK_SUFFIX));

        let send_goal_type = interface.sibling(SEND_GOAL_SUFFIX);
        let send_goal = ServiceDescriptor {
            parts: Some(ServiceParts {
                request: MessageDescriptor::new(send_goal_type.sibling(REQUEST_SUFFIX))
                    .with_field("goal_id", goal_id_type())
                    .with_field("goal", local(GOAL_SUFFIX)),
                response: MessageDescriptor::new(send_goal_type.sibling(RESPONSE_SUFFIX))
                    .with_field("accepted", FieldType::primitive("bool"))
                    .with_field(
                        "stamp",
                        FieldType::message("builtin_interfaces", "Time"),
                    ),
            }),
            interface: send_goal_type,
        };

        let get_result_type = interface.sibling(GET_RESULT_SUFFIX);
        let get_result = ServiceDescriptor {
            parts: Some(ServiceParts {
                request: MessageDescriptor::new(get_result_type.sibling(REQUEST_SUFFIX))
                    .with_field("goal_id", goal_id_type()),
                response: MessageDescriptor::new(get_result_type.sibling(RESPONSE_SUFFIX))
                    .with_field("status", FieldType::primitive("int8"))
                    .with_field("result", local(RESULT_SUFFIX)),
            }),
            interface: get_result_type,
        };

        let mut descriptors: Vec<InterfaceDescriptor> = vec![
            ActionDescriptor {
                interface: interface.clone(),
                parts: Some(Box::new(ActionParts {
                    goal: goal.clone(),
                    result: result.clone(),
                    feedback: feedback.clone(),
                    feedback_message: feedback_message.clone(),
                    send_goal: send_goal.clone(),
                    get_result: get_result.clone(),
                })),
            }
            .into(),
            goal.into(),
            result.into(),
            feedback.into(),
            feedback_message.into(),
        ];
        for service in [send_goal, get_result] {
            descriptors.extend(self.expand_internal_service(service));
        }
        Ok(descriptors)
    }

    /// An internal action service followed by its request, response and
    /// (optionally) event messages.
    fn expand_internal_service(&self, service: ServiceDescriptor) -> Vec<InterfaceDescriptor> {
        let mut descriptors = Vec::with_capacity(4);
        if let Some(parts) = &service.parts {
            descriptors.push(parts.request.clone().into());
            descriptors.push(parts.response.clone().into());
        }
        if self.service_events {
            descriptors.push(service_event(&service.interface));
        }
        descriptors.insert(0, service.into());
        descriptors
    }
}

impl DescriptorLoader for IdlFileLoader {
    fn load(&self, reference: &InterfaceReference) -> Result<Vec<InterfaceDescriptor>, LoadError> {
        let path = reference.file_path.as_path();
        let body = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let interface = InterfaceType::new(
            reference.package_name.clone(),
            reference.sub_folder.clone(),
            reference.interface_name.clone(),
        );

        match reference.category {
            InterfaceCategory::Message => Ok(vec![parse_message(interface, &body, path)?.into()]),
            InterfaceCategory::Service => self.load_service(interface, &body, path),
            InterfaceCategory::Action => self.load_action(interface, &body, path),
        }
    }
}

fn build_service(
    interface: InterfaceType,
    body: &str,
    path: &Path,
) -> Result<ServiceDescriptor, LoadError> {
    let blocks = split_blocks(body);
    let parts = match blocks.as_slice() {
        [request, response] => Some(ServiceParts {
            request: parse_message(interface.sibling(REQUEST_SUFFIX), request, path)?,
            response: parse_message(interface.sibling(RESPONSE_SUFFIX), response, path)?,
        }),
        _ => None,
    };
    Ok(ServiceDescriptor { interface, parts })
}

fn goal_id_type() -> FieldType {
    FieldType::message("unique_identifier_msgs", "UUID")
}

/// `<Service>_Event` wrapper carrying at most one request and one response.
fn service_event(service: &InterfaceType) -> InterfaceDescriptor {
    let package = service.package.as_str();
    let bounded = |suffix: &str| {
        FieldType::message(package, format!("{}{}", service.name, suffix)).bounded_array(1)
    };

    MessageDescriptor::new(service.sibling(EVENT_SUFFIX))
        .with_field(
            "info",
            FieldType::message("service_msgs", "ServiceEventInfo"),
        )
        .with_field("request", bounded(REQUEST_SUFFIX))
        .with_field("response", bounded(RESPONSE_SUFFIX))
        .into()
}

/// Descriptors of one subfolder, in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct SubFolder {
    pub name: String,
    pub descriptors: Vec<InterfaceDescriptor>,
}

impl SubFolder {
    pub fn find(&self, interface_name: &str) -> Option<&InterfaceDescriptor> {
        self.descriptors.iter().find(|d| d.name() == interface_name)
    }
}

/// Descriptors of one package, grouped by subfolder.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDescriptors {
    pub package_name: String,
    pub sub_folders: Vec<SubFolder>,
}

impl PackageDescriptors {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            sub_folders: Vec::new(),
        }
    }

    /// Append a descriptor to its subfolder. A name already present in the
    /// subfolder is kept and the new descriptor dropped.
    pub fn push(&mut self, descriptor: InterfaceDescriptor) -> bool {
        let sub_folder = descriptor.interface().sub_folder.clone();
        let index = match self.sub_folders.iter().position(|s| s.name == sub_folder) {
            Some(index) => index,
            None => {
                self.sub_folders.push(SubFolder {
                    name: sub_folder,
                    descriptors: Vec::new(),
                });
                self.sub_folders.len() - 1
            }
        };

        let folder = &mut self.sub_folders[index];
        if folder.find(descriptor.name()).is_some() {
            return false;
        }
        folder.descriptors.push(descriptor);
        true
    }

    pub fn descriptor_count(&self) -> usize {
        self.sub_folders.iter().map(|s| s.descriptors.len()).sum()
    }
}

/// Load every reference of every package.
pub fn load_packages(
    packages: &PackageMap,
    loader: &dyn DescriptorLoader,
) -> Result<Vec<PackageDescriptors>, LoadError> {
    let mut loaded = Vec::with_capacity(packages.len());

    for record in packages.iter() {
        let mut package = PackageDescriptors::new(&record.package_name);

        for reference in record.references() {
            for descriptor in loader.load(reference)? {
                if !package.push(descriptor) {
                    tracing::debug!("Duplicate descriptor ignored in {}", reference);
                }
            }
        }

        tracing::debug!(
            "Loaded {} descriptor(s) for {}",
            package.descriptor_count(),
            package.package_name
        );
        loaded.push(package);
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, relative: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, body).expect("write");
        path
    }

    fn names(descriptors: &[InterfaceDescriptor]) -> Vec<&str> {
        descriptors.iter().map(InterfaceDescriptor::name).collect()
    }

    #[test]
    fn test_load_service() {
        let dir = tempdir().expect("tempdir");
        let path = write(dir.path(), "demo/srv/Add.srv", "int64 a\nint64 b\n---\nint64 sum\n");
        let reference =
            InterfaceReference::new("demo", "srv", "Add", InterfaceCategory::Service, path);

        let descriptors = IdlFileLoader::new().load(&reference).expect("load");
        assert_eq!(names(&descriptors), vec!["Add"]);
        let parts = descriptors[0]
            .as_service()
            .and_then(|s| s.parts.as_ref())
            .expect("parts");
        assert_eq!(parts.request.interface.name, "Add_Request");
        assert_eq!(parts.response.fields[0].name, "sum");
    }

    #[test]
    fn test_malformed_service_has_no_parts() {
        let dir = tempdir().expect("tempdir");
        let path = write(dir.path(), "demo/srv/Odd.srv", "int64 a\n");
        let reference =
            InterfaceReference::new("demo", "srv", "Odd", InterfaceCategory::Service, path);

        let descriptors = IdlFileLoader::new()
            .with_service_events(true)
            .load(&reference)
            .expect("load");
        assert_eq!(descriptors.len(), 1);
        assert!(descriptors[0].as_service().expect("service").parts.is_none());
    }

    #[test]
    fn test_service_event() {
        let dir = tempdir().expect("tempdir");
        let path = write(dir.path(), "demo/srv/Add.srv", "int64 a\n---\nint64 sum\n");
        let reference =
            InterfaceReference::new("demo", "srv", "Add", InterfaceCategory::Service, path);

        let descriptors = IdlFileLoader::new()
            .with_service_events(true)
            .load(&reference)
            .expect("load");
        assert_eq!(names(&descriptors), vec!["Add", "Add_Event"]);
        let event = descriptors[1].as_message().expect("message");
        let request = &event.fields[1].field_type;
        assert_eq!(request.type_name, "Add_Request");
        assert!(request.is_upper_bound);
        assert_eq!(request.array_bound, Some(1));
        assert_eq!(request.owner_interface, "demo/srv/Add_Event");
    }

    #[test]
    fn test_load_action_expands_siblings() {
        let dir = tempdir().expect("tempdir");
        let path = write(
            dir.path(),
            "demo/action/Fib.action",
            "int32 order\n---\nint32[] sequence\n---\nint32[] partial\n",
        );
        let reference =
            InterfaceReference::new("demo", "action", "Fib", InterfaceCategory::Action, path);

        let descriptors = IdlFileLoader::new().load(&reference).expect("load");
        assert_eq!(
            names(&descriptors),
            vec![
                "Fib",
                "Fib_Goal",
                "Fib_Result",
                "Fib_Feedback",
                "Fib_FeedbackMessage",
                "Fib_SendGoal",
                "Fib_SendGoal_Request",
                "Fib_SendGoal_Response",
                "Fib_GetResult",
                "Fib_GetResult_Request",
                "Fib_GetResult_Response",
            ]
        );
        assert!(descriptors
            .iter()
            .all(|d| d.interface().sub_folder == "action"));

        let feedback_message = descriptors[4].as_message().expect("message");
        assert_eq!(
            feedback_message.fields[0].field_type.owner_package.as_deref(),
            Some("unique_identifier_msgs")
        );
        assert_eq!(feedback_message.fields[1].field_type.type_name, "Fib_Feedback");
    }

    #[test]
    fn test_malformed_action() {
        let dir = tempdir().expect("tempdir");
        let path = write(dir.path(), "demo/action/Bad.action", "int32 a\n---\nint32 b\n");
        let reference =
            InterfaceReference::new("demo", "action", "Bad", InterfaceCategory::Action, path);

        let descriptors = IdlFileLoader::new().load(&reference).expect("load");
        assert_eq!(descriptors.len(), 1);
        assert!(descriptors[0].as_action().expect("action").parts.is_none());
    }

    #[test]
    fn test_load_packages_groups_by_subfolder() {
        let dir = tempdir().expect("tempdir");
        let mut packages = PackageMap::new();
        for (sub, name, category, body) in [
            ("msg", "Point", InterfaceCategory::Message, "float64 x\n"),
            ("srv", "Reset", InterfaceCategory::Service, "---\n"),
            ("msg", "Pose", InterfaceCategory::Message, "Point position\n"),
        ] {
            let path = write(
                dir.path(),
                &format!("demo/{sub}/{name}.{}", category.extension()),
                body,
            );
            packages.add(InterfaceReference::new("demo", sub, name, category, path));
        }

        let loaded = load_packages(&packages, &IdlFileLoader::new()).expect("load");
        assert_eq!(loaded.len(), 1);
        let folders: Vec<&str> = loaded[0].sub_folders.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(folders, vec!["msg", "srv"]);
        assert_eq!(names(&loaded[0].sub_folders[0].descriptors), vec!["Point", "Pose"]);
        assert!(loaded[0].sub_folders[0].find("Pose").is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let reference = InterfaceReference::new(
            "demo",
            "msg",
            "Ghost",
            InterfaceCategory::Message,
            "/nonexistent/Ghost.msg",
        );
        assert!(matches!(
            IdlFileLoader::new().load(&reference),
            Err(LoadError::Io { .. })
        ));
    }
}

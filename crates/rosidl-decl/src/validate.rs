// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Completeness validation and internal-interface classification.

use crate::idl::loader::{
    EVENT_SUFFIX, FEEDBACK_MESSAGE_SUFFIX, FEEDBACK_SUFFIX, GET_RESULT_SUFFIX, GOAL_SUFFIX,
    RESULT_SUFFIX, SEND_GOAL_SUFFIX,
};
use crate::idl::{ActionDescriptor, InterfaceDescriptor, InterfaceType, ServiceDescriptor};
use crate::splitter::{REQUEST_SUFFIX, RESPONSE_SUFFIX};

/// Message name suffixes of the wrappers generated for actions.
pub const INTERNAL_ACTION_MESSAGE_SUFFIXES: [&str; 5] = [
    "_FeedbackMessage",
    "_SendGoal_Request",
    "_SendGoal_Response",
    "_GetResult_Request",
    "_GetResult_Response",
];

/// Service name suffixes of the services generated for actions.
pub const INTERNAL_ACTION_SERVICE_SUFFIXES: [&str; 2] = [GET_RESULT_SUFFIX, SEND_GOAL_SUFFIX];

/// Subfolders that may hold service event wrappers.
pub const SERVICE_EVENT_SUB_FOLDERS: [&str; 3] = ["srv", "srvs", "action"];

/// Whether an interface is meant for generic lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceRole {
    Public,
    /// Feedback wrapper or goal/result request/response of an action.
    InternalActionMessage,
    /// `<Service>_Event` wrapper.
    ServiceEventMessage,
    /// `_SendGoal` / `_GetResult` service of an action.
    InternalActionService,
}

impl InterfaceRole {
    /// Classify a loaded descriptor.
    pub fn of(descriptor: &InterfaceDescriptor) -> Self {
        let interface = descriptor.interface();
        match descriptor {
            InterfaceDescriptor::Message(_) => Self::of_message(interface),
            InterfaceDescriptor::Service(_) => Self::of_service(interface),
            InterfaceDescriptor::Action(_) => Self::Public,
        }
    }

    pub fn of_message(interface: &InterfaceType) -> Self {
        let name = interface.name.as_str();
        if INTERNAL_ACTION_MESSAGE_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix))
        {
            Self::InternalActionMessage
        } else if SERVICE_EVENT_SUB_FOLDERS.contains(&interface.sub_folder.as_str())
            && name.ends_with(EVENT_SUFFIX)
        {
            Self::ServiceEventMessage
        } else {
            Self::Public
        }
    }

    pub fn of_service(interface: &InterfaceType) -> Self {
        if INTERNAL_ACTION_SERVICE_SUFFIXES
            .iter()
            .any(|suffix| interface.name.ends_with(suffix))
        {
            Self::InternalActionService
        } else {
            Self::Public
        }
    }

    /// Excluded from the flattened lookup tables.
    pub fn is_internal(self) -> bool {
        self != Self::Public
    }

    /// Same-package message references resolve to the interface's own
    /// subfolder instead of `msg`.
    pub fn uses_own_sub_folder(self) -> bool {
        matches!(self, Self::InternalActionMessage | Self::ServiceEventMessage)
    }
}

/// A service is valid when it has both parts and exactly two siblings are
/// named `<Service>_Request` and `<Service>_Response`.
pub fn is_valid_service(service: &ServiceDescriptor, siblings: &[InterfaceDescriptor]) -> bool {
    if service.parts.is_none() {
        return false;
    }

    let name = &service.interface.name;
    let request = format!("{name}{REQUEST_SUFFIX}");
    let response = format!("{name}{RESPONSE_SUFFIX}");
    let matches = siblings
        .iter()
        .filter(|sibling| sibling.name() == request || sibling.name() == response)
        .count();
    matches == 2
}

/// An action is valid when it has all parts and its siblings contain the
/// action itself, its goal, result, feedback and feedback message, and both
/// internal services, each valid on its own.
pub fn is_valid_action(action: &ActionDescriptor, siblings: &[InterfaceDescriptor]) -> bool {
    if action.parts.is_none() {
        return false;
    }

    let name = &action.interface.name;
    let required: Vec<String> = [
        "",
        FEEDBACK_SUFFIX,
        FEEDBACK_MESSAGE_SUFFIX,
        GOAL_SUFFIX,
        RESULT_SUFFIX,
    ]
    .iter()
    .map(|suffix| format!("{name}{suffix}"))
    .collect();
    let services: Vec<String> = INTERNAL_ACTION_SERVICE_SUFFIXES
        .iter()
        .map(|suffix| format!("{name}{suffix}"))
        .collect();

    let matches = siblings
        .iter()
        .filter(|sibling| {
            let sibling_name = sibling.name();
            if required.iter().any(|r| r == sibling_name) {
                return true;
            }
            services.iter().any(|s| s == sibling_name)
                && sibling
                    .as_service()
                    .is_some_and(|service| is_valid_service(service, siblings))
        })
        .count();
    matches == required.len() + services.len()
}

/// A `<Service>_Event` wrapper is declarable unless the service it wraps is
/// among its siblings and incomplete.
pub fn is_declarable_event(event: &InterfaceType, siblings: &[InterfaceDescriptor]) -> bool {
    let Some(service_name) = event.name.strip_suffix(EVENT_SUFFIX) else {
        return true;
    };
    siblings
        .iter()
        .filter_map(InterfaceDescriptor::as_service)
        .find(|service| service.interface.name == service_name)
        .map_or(true, |service| is_valid_service(service, siblings))
}

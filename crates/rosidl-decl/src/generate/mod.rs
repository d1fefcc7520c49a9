// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declaration generator.
//!
//! Emits one `declare module` block holding a namespace per package and
//! subfolder, followed by flattened lookup tables keyed by
//! `<package>/<subfolder>/<interface>`.
//!
//! Services and actions failing completeness validation are left out and
//! reported. Internal action and service-event interfaces are declared in
//! their namespace but kept out of the lookup tables.

pub mod writer;

use crate::classify::{constant_type, field_type_name};
use crate::idl::{
    ActionDescriptor, InterfaceDescriptor, MessageDescriptor, PackageDescriptors,
    ServiceDescriptor,
};
use crate::validate::{is_declarable_event, is_valid_action, is_valid_service, InterfaceRole};
use indexmap::IndexMap;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use writer::DeclarationWriter;

/// Default name of the declared module.
pub const DEFAULT_MODULE_NAME: &str = "rclnodejs";

const GENERATOR_NAME: &str = env!("CARGO_PKG_NAME");

/// Generation errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unresolved type '{type_name}' in {interface}")]
    UnresolvedType { type_name: String, interface: String },
}

/// What a generation pass emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    /// Packages with at least one namespace.
    pub packages: usize,
    /// Message declarations, internal ones included.
    pub messages: usize,
    pub services: usize,
    pub actions: usize,
    /// Declared interfaces kept out of the lookup tables.
    pub internal: usize,
    /// Services and actions dropped by completeness validation.
    pub incomplete: Vec<String>,
}

/// Lookup tables collected while walking the hierarchy.
#[derive(Default)]
struct LookupTables {
    messages: IndexMap<String, String>,
    services: IndexMap<String, String>,
    actions: IndexMap<String, String>,
}

/// Emits the declaration text.
#[derive(Debug, Clone)]
pub struct DeclarationGenerator {
    module_name: String,
}

impl Default for DeclarationGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE_NAME)
    }
}

impl DeclarationGenerator {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Emit the whole declaration for `packages`, in their order.
    pub fn emit<W: Write>(
        &self,
        packages: &[PackageDescriptors],
        out: &mut DeclarationWriter<W>,
    ) -> Result<GenerationSummary, GenerateError> {
        let mut summary = GenerationSummary::default();
        let mut tables = LookupTables::default();

        out.line(0, "/* eslint-disable camelcase */")?;
        out.line(0, "/* eslint-disable max-len */")?;
        out.line(0, "// DO NOT EDIT")?;
        out.line(0, &format!("// This file is generated by {GENERATOR_NAME}"))?;
        out.blank()?;
        out.line(0, &format!("declare module '{}' {{", self.module_name))?;

        for package in packages {
            if package.sub_folders.is_empty() {
                continue;
            }
            summary.packages += 1;
            out.line(1, &format!("namespace {} {{", package.package_name))?;

            for sub_folder in &package.sub_folders {
                out.line(2, &format!("namespace {} {{", sub_folder.name))?;
                for descriptor in &sub_folder.descriptors {
                    self.emit_descriptor(
                        descriptor,
                        &sub_folder.descriptors,
                        out,
                        &mut tables,
                        &mut summary,
                    )?;
                }
                out.line(2, "}")?;
            }

            out.line(1, "}")?;
            out.blank()?;
        }

        emit_tables(&tables, out)?;
        out.line(0, "}")?;

        tracing::debug!("Emitted {} line(s)", out.lines_written());
        Ok(summary)
    }

    fn emit_descriptor<W: Write>(
        &self,
        descriptor: &InterfaceDescriptor,
        siblings: &[InterfaceDescriptor],
        out: &mut DeclarationWriter<W>,
        tables: &mut LookupTables,
        summary: &mut GenerationSummary,
    ) -> Result<(), GenerateError> {
        let interface = descriptor.interface();
        let key = interface.full_name();
        let role = InterfaceRole::of(descriptor);

        match descriptor {
            InterfaceDescriptor::Message(message) => {
                if role == InterfaceRole::ServiceEventMessage
                    && !is_declarable_event(interface, siblings)
                {
                    tracing::debug!("Skipping {}, its service is incomplete", key);
                    return Ok(());
                }
                emit_message(message, role, out)?;
                summary.messages += 1;
                if role.is_internal() {
                    summary.internal += 1;
                } else {
                    tables.messages.insert(key, interface.namespace_path());
                }
            }
            InterfaceDescriptor::Service(service) => {
                if !is_valid_service(service, siblings) {
                    let name = interface.namespace_path();
                    tracing::warn!("Incomplete service: {}.", name);
                    summary.incomplete.push(name);
                    return Ok(());
                }
                emit_service(service, out)?;
                summary.services += 1;
                if role.is_internal() {
                    summary.internal += 1;
                } else {
                    tables
                        .services
                        .insert(key, format!("{}Constructor", interface.namespace_path()));
                }
            }
            InterfaceDescriptor::Action(action) => {
                if !is_valid_action(action, siblings) {
                    let name = interface.namespace_path();
                    tracing::warn!("Incomplete action: {}.", name);
                    summary.incomplete.push(name);
                    return Ok(());
                }
                emit_action(action, out)?;
                summary.actions += 1;
                tables
                    .actions
                    .insert(key, format!("{}Constructor", interface.namespace_path()));
            }
        }
        Ok(())
    }
}

fn emit_message<W: Write>(
    message: &MessageDescriptor,
    role: InterfaceRole,
    out: &mut DeclarationWriter<W>,
) -> Result<(), GenerateError> {
    let interface = &message.interface;
    let name = &interface.name;

    out.line(3, &format!("export interface {name} {{"))?;
    for field in &message.fields {
        let declared = field_type_name(&field.field_type, interface, role)?;
        out.line(4, &format!("{}: {};", field.name, declared))?;
    }
    out.line(3, "}")?;

    out.line(3, &format!("export interface {name}Constructor {{"))?;
    for constant in &message.constants {
        let declared = constant_type(&constant.field_type)?;
        out.line(4, &format!("readonly {}: {};", constant.name, declared))?;
    }
    out.line(4, &format!("new(other?: {name}): {name};"))?;
    out.line(3, "}")?;
    Ok(())
}

fn emit_service<W: Write>(
    service: &ServiceDescriptor,
    out: &mut DeclarationWriter<W>,
) -> io::Result<()> {
    let name = &service.interface.name;
    out.line(
        3,
        &format!("export interface {name}Constructor extends ROSService {{"),
    )?;
    out.line(4, &format!("readonly Request: {name}_RequestConstructor;"))?;
    out.line(4, &format!("readonly Response: {name}_ResponseConstructor;"))?;
    out.line(3, "}")
}

fn emit_action<W: Write>(action: &ActionDescriptor, out: &mut DeclarationWriter<W>) -> io::Result<()> {
    let name = &action.interface.name;
    out.line(3, &format!("export interface {name}Constructor {{"))?;
    out.line(4, &format!("readonly Goal: {name}_GoalConstructor;"))?;
    out.line(4, &format!("readonly Result: {name}_ResultConstructor;"))?;
    out.line(4, &format!("readonly Feedback: {name}_FeedbackConstructor;"))?;
    out.line(3, "}")
}

fn emit_tables<W: Write>(tables: &LookupTables, out: &mut DeclarationWriter<W>) -> io::Result<()> {
    out.line(1, "type MessagesMap = {")?;
    out.line(2, "'string': string,")?;
    for (key, path) in &tables.messages {
        out.line(2, &format!("'{key}': {path},"))?;
    }
    out.line(1, "};")?;
    out.line(1, "type MessageTypeClassName = keyof MessagesMap;")?;
    out.line(1, "type Message = MessagesMap[MessageTypeClassName];")?;
    out.line(
        1,
        "type MessageType<T> = T extends MessageTypeClassName ? MessagesMap[T] : object;",
    )?;
    out.blank()?;

    out.line(1, "type MessageTypeClassConstructorMap = {")?;
    out.line(2, "'string': never,")?;
    for (key, path) in &tables.messages {
        out.line(2, &format!("'{key}': {path}Constructor,"))?;
    }
    out.line(1, "};")?;
    out.line(
        1,
        "type MessageConstructorType<T> = T extends MessageTypeClassName ? MessageTypeClassConstructorMap[T] : object;",
    )?;
    out.blank()?;

    emit_lookup(out, "Service", &tables.services)?;
    emit_lookup(out, "Action", &tables.actions)?;

    out.line(
        1,
        "type TypeClassName = MessageTypeClassName | ServiceTypeClassName | ActionTypeClassName;",
    )?;
    out.line(
        1,
        "type InterfaceType<T> = T extends TypeClassName ? (MessageTypeClassConstructorMap & ServicesMap & ActionsMap)[T] : object;",
    )
}

/// `<Kind>sMap` table with its class-name, union and lookup types.
fn emit_lookup<W: Write>(
    out: &mut DeclarationWriter<W>,
    kind: &str,
    entries: &IndexMap<String, String>,
) -> io::Result<()> {
    out.line(1, &format!("type {kind}sMap = {{"))?;
    for (key, path) in entries {
        out.line(2, &format!("'{key}': {path},"))?;
    }
    out.line(1, "};")?;
    out.line(1, &format!("type {kind}TypeClassName = keyof {kind}sMap;"))?;
    out.line(1, &format!("type {kind} = {kind}sMap[{kind}TypeClassName];"))?;
    out.line(
        1,
        &format!(
            "type {kind}Type<T> = T extends {kind}TypeClassName ? {kind}sMap[T] : object;"
        ),
    )?;
    out.blank()
}

/// Render the declaration and write it to `path`, replacing any previous
/// content. Parent directories are created.
///
/// Nothing is written when rendering fails.
pub fn write_declarations(
    path: &Path,
    packages: &[PackageDescriptors],
    generator: &DeclarationGenerator,
) -> Result<GenerationSummary, GenerateError> {
    let mut out = DeclarationWriter::new(Vec::new());
    let summary = generator.emit(packages, &mut out)?;
    let rendered = out.finish()?;

    let output_error = |source| GenerateError::Output {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(output_error)?;
    }
    std::fs::write(path, rendered).map_err(output_error)?;

    tracing::info!("[OK] Declarations written to {}", path.display());
    Ok(summary)
}

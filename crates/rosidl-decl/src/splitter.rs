// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service splitter.
//!
//! Splits a `.srv` file into `<Service>_Request.msg` / `<Service>_Response.msg`
//! under `<work_dir>/srv_msg/<package>/` when the halves are not already
//! materialized next to the service file.

use crate::model::InterfaceReference;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Subdirectory of the work directory holding synthesized halves.
pub const SERVICE_MSG_DIR: &str = "srv_msg";

pub const REQUEST_SUFFIX: &str = "_Request";
pub const RESPONSE_SUFFIX: &str = "_Response";

/// A line made of three or more dashes.
const SEPARATOR_PATTERN: &str = r"(?m)^-{3,}[ \t]*(?:\r?\n|\z)";

/// Splitter errors.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SplitError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result of splitting one service file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    /// `<Service>_Request.msg` already sits next to the service file.
    AlreadyMaterialized,
    /// Halves are available in the work directory.
    Split {
        request: InterfaceReference,
        response: InterfaceReference,
        /// `false` when both files were already up to date.
        written: bool,
    },
    /// Body does not split into exactly two blocks.
    Malformed { blocks: usize },
}

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(SEPARATOR_PATTERN).expect("separator pattern is valid"))
}

/// Split an IDL body on dash separator lines.
pub fn split_blocks(content: &str) -> Vec<&str> {
    separator().split(content).collect()
}

/// Split a service body into its request and response blocks.
pub fn split_service_body(content: &str) -> Option<(&str, &str)> {
    match split_blocks(content).as_slice() {
        [request, response] => Some((request, response)),
        _ => None,
    }
}

/// Writes Request/Response halves of service files.
#[derive(Debug, Clone)]
pub struct ServiceSplitter {
    output_root: PathBuf,
}

impl ServiceSplitter {
    /// Create a splitter staging its output under `<work_dir>/srv_msg`.
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        Self {
            output_root: work_dir.as_ref().join(SERVICE_MSG_DIR),
        }
    }

    /// Directory receiving the halves of a package's services.
    pub fn package_dir(&self, package_name: &str) -> PathBuf {
        self.output_root.join(package_name)
    }

    /// Path of the sibling that marks a service as already materialized.
    pub fn materialized_request_path(service: &InterfaceReference) -> PathBuf {
        let file_name = format!("{}{}.msg", service.interface_name, REQUEST_SUFFIX);
        match service.file_path.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Split a service file.
    pub async fn split(&self, service: &InterfaceReference) -> Result<SplitOutcome, SplitError> {
        let sibling = Self::materialized_request_path(service);
        if tokio::fs::try_exists(&sibling)
            .await
            .map_err(|e| SplitError::io(&sibling, e))?
        {
            tracing::debug!("{} already materialized", service.full_name());
            return Ok(SplitOutcome::AlreadyMaterialized);
        }

        let content = tokio::fs::read_to_string(&service.file_path)
            .await
            .map_err(|e| SplitError::io(&service.file_path, e))?;

        let blocks = split_blocks(&content);
        let (request_body, response_body) = match blocks.as_slice() {
            [request, response] => (*request, *response),
            _ => {
                tracing::debug!(
                    "{} splits into {} block(s), no halves produced",
                    service.full_name(),
                    blocks.len()
                );
                return Ok(SplitOutcome::Malformed {
                    blocks: blocks.len(),
                });
            }
        };

        let package_dir = self.package_dir(&service.package_name);
        tokio::fs::create_dir_all(&package_dir)
            .await
            .map_err(|e| SplitError::io(&package_dir, e))?;

        let request_path =
            package_dir.join(format!("{}{}.msg", service.interface_name, REQUEST_SUFFIX));
        let response_path =
            package_dir.join(format!("{}{}.msg", service.interface_name, RESPONSE_SUFFIX));

        let wrote_request = write_if_changed(&request_path, request_body).await?;
        let wrote_response = write_if_changed(&response_path, response_body).await?;

        Ok(SplitOutcome::Split {
            request: service.derived_half(REQUEST_SUFFIX, request_path),
            response: service.derived_half(RESPONSE_SUFFIX, response_path),
            written: wrote_request || wrote_response,
        })
    }
}

async fn write_if_changed(path: &Path, content: &str) -> Result<bool, SplitError> {
    match tokio::fs::read_to_string(path).await {
        Ok(existing) if existing == content => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(SplitError::io(path, e)),
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| SplitError::io(path, e))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InterfaceCategory;
    use tempfile::tempdir;

    fn service_ref(dir: &Path, name: &str, body: &str) -> InterfaceReference {
        let srv_dir = dir.join("share/demo_srvs/srv");
        std::fs::create_dir_all(&srv_dir).expect("mkdir");
        let path = srv_dir.join(format!("{name}.srv"));
        std::fs::write(&path, body).expect("write");
        InterfaceReference::new("demo_srvs", "srv", name, InterfaceCategory::Service, path)
    }

    #[test]
    fn test_split_service_body() {
        let (request, response) =
            split_service_body("A\nfieldA: int32\n---\nfieldB: string\n").expect("split");
        assert_eq!(request, "A\nfieldA: int32\n");
        assert_eq!(response, "fieldB: string\n");
    }

    #[test]
    fn test_split_blocks_needs_whole_line() {
        assert_eq!(split_blocks("int32 a # ----\n").len(), 1);
        assert_eq!(split_blocks("int32 a\n-----\nint32 b\n---\nint32 c").len(), 3);
        assert_eq!(split_blocks("--\nint32 a\n").len(), 1);
        assert_eq!(split_blocks("---\n"), vec!["", ""]);
    }

    #[tokio::test]
    async fn test_split_writes_halves() {
        let dir = tempdir().expect("tempdir");
        let service = service_ref(dir.path(), "Foo", "A\nfieldA: int32\n---\nfieldB: string\n");
        let splitter = ServiceSplitter::new(dir.path().join("work"));

        let (request, response, written) = match splitter.split(&service).await.expect("split") {
            SplitOutcome::Split {
                request,
                response,
                written,
            } => (request, response, written),
            other => panic!("expected split, got {other:?}"),
        };

        assert!(written);
        assert_eq!(request.interface_name, "Foo_Request");
        assert_eq!(response.interface_name, "Foo_Response");
        assert!(request.synthesized_from_service);
        assert_eq!(
            request.file_path,
            dir.path().join("work/srv_msg/demo_srvs/Foo_Request.msg")
        );
        assert_eq!(
            std::fs::read_to_string(&request.file_path).expect("read"),
            "A\nfieldA: int32\n"
        );
        assert_eq!(
            std::fs::read_to_string(&response.file_path).expect("read"),
            "fieldB: string\n"
        );
    }

    #[tokio::test]
    async fn test_split_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        let service = service_ref(dir.path(), "Foo", "int32 a\n---\nint32 b\n");
        let splitter = ServiceSplitter::new(dir.path().join("work"));

        let first = splitter.split(&service).await.expect("first");
        let second = splitter.split(&service).await.expect("second");

        match (&first, &second) {
            (
                SplitOutcome::Split {
                    request: r1,
                    written: true,
                    ..
                },
                SplitOutcome::Split {
                    request: r2,
                    written: false,
                    ..
                },
            ) => {
                assert_eq!(r1, r2);
                assert_eq!(
                    std::fs::read_to_string(&r2.file_path).expect("read"),
                    "int32 a\n"
                );
            }
            other => panic!("unexpected outcomes: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_service_produces_nothing() {
        let dir = tempdir().expect("tempdir");
        let service = service_ref(dir.path(), "NoSeparator", "int32 a\nint32 b\n");
        let splitter = ServiceSplitter::new(dir.path().join("work"));

        let outcome = splitter.split(&service).await.expect("split");
        assert_eq!(outcome, SplitOutcome::Malformed { blocks: 1 });
        assert!(!dir.path().join("work/srv_msg/demo_srvs").exists());
    }

    #[tokio::test]
    async fn test_materialized_sibling_skips_split() {
        let dir = tempdir().expect("tempdir");
        let service = service_ref(dir.path(), "Foo", "int32 a\n---\nint32 b\n");
        std::fs::write(
            ServiceSplitter::materialized_request_path(&service),
            "int32 a\n",
        )
        .expect("write");
        let splitter = ServiceSplitter::new(dir.path().join("work"));

        let outcome = splitter.split(&service).await.expect("split");
        assert_eq!(outcome, SplitOutcome::AlreadyMaterialized);
        assert!(!dir.path().join("work").exists());
    }
}

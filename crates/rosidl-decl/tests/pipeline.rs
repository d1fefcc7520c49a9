// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// End-to-end runs over ament-style and raw source trees built in a tempdir.

use rosidl_decl::{FilterRule, GeneratorConfig, ScanResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const RESOURCE_INDEX: &str = "share/ament_index/resource_index/rosidl_interfaces";

fn write(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, body).expect("write");
}

/// Install prefix with `demo_msgs` and `test_msgs`.
fn ament_tree(root: &Path) {
    write(
        root,
        &format!("{RESOURCE_INDEX}/demo_msgs"),
        "msg/Point.idl\nmsg/Point.msg\nsrv/Add.srv\nsrv/Broken.srv\naction/Fib.action\n",
    );
    write(root, &format!("{RESOURCE_INDEX}/test_msgs"), "msg/Nested.msg\n");

    write(
        root,
        "share/demo_msgs/msg/Point.msg",
        "# A point\nfloat64 x\nfloat64 y\nuint8[] tags\nint32 ORIGIN=0\n",
    );
    write(root, "share/demo_msgs/msg/Point.idl", "module demo_msgs {};\n");
    write(
        root,
        "share/demo_msgs/srv/Add.srv",
        "int64 a\nint64 b\n---\nint64 sum\n",
    );
    write(root, "share/demo_msgs/srv/Broken.srv", "int64 a\n");
    write(
        root,
        "share/demo_msgs/action/Fib.action",
        "int32 order\n---\nint32[] sequence\n---\nPoint[] partial\n",
    );
    write(root, "share/test_msgs/msg/Nested.msg", "Point p\n");
}

fn config_for(root: &Path, work: &Path) -> GeneratorConfig {
    GeneratorConfig::default()
        .root(root)
        .work_dir(work.join("generated"))
        .output(work.join("types/interfaces.d.ts"))
}

fn reference_names(scan: &ScanResult) -> BTreeSet<String> {
    scan.packages
        .iter()
        .flat_map(|record| record.references())
        .map(|reference| reference.full_name())
        .collect()
}

#[tokio::test]
async fn test_ament_generation() {
    let root = tempdir().expect("tempdir");
    let work = tempdir().expect("tempdir");
    ament_tree(root.path());

    let config = config_for(root.path(), work.path()).filter(FilterRule::package("test_msgs"));
    let report = rosidl_decl::generate_declarations(&config)
        .await
        .expect("generate");
    let text = std::fs::read_to_string(&config.output).expect("read output");

    // Hierarchy
    assert!(text.contains("declare module 'rclnodejs' {\n"));
    assert!(text.contains(
        "      export interface Point {\n\
         \x20       x: number;\n\
         \x20       y: number;\n\
         \x20       tags: number[] | Uint8Array;\n\
         \x20     }\n\
         \x20     export interface PointConstructor {\n\
         \x20       readonly ORIGIN: number;\n\
         \x20       new(other?: Point): Point;\n\
         \x20     }\n"
    ));
    assert!(text.contains("      export interface AddConstructor extends ROSService {\n"));
    assert!(text.contains("      export interface FibConstructor {\n"));
    assert!(text.contains("        partial: demo_msgs.msg.Point[];\n"));
    assert!(text.contains("        feedback: demo_msgs.action.Fib_Feedback;\n"));
    assert!(text.contains("        goal_id: unique_identifier_msgs.msg.UUID;\n"));

    // Lookup tables
    assert!(text.contains("    'demo_msgs/msg/Point': demo_msgs.msg.Point,\n"));
    assert!(text.contains("    'demo_msgs/srv/Add_Request': demo_msgs.srv.Add_Request,\n"));
    assert!(text.contains("    'demo_msgs/srv/Add': demo_msgs.srv.AddConstructor,\n"));
    assert!(text.contains("    'demo_msgs/action/Fib': demo_msgs.action.FibConstructor,\n"));

    // Incomplete service dropped
    assert!(!text.contains("BrokenConstructor"));
    assert_eq!(report.summary.incomplete, vec!["demo_msgs.srv.Broken".to_string()]);

    // Internal interfaces declared but not looked up
    assert!(text.contains("      export interface Fib_FeedbackMessage {\n"));
    assert!(text.contains("      export interface Fib_SendGoalConstructor extends ROSService {\n"));
    assert!(!text.contains("'demo_msgs/action/Fib_FeedbackMessage'"));
    assert!(!text.contains("'demo_msgs/action/Fib_SendGoal_Request'"));
    assert!(!text.contains("'demo_msgs/action/Fib_GetResult'"));

    // Filtered package
    assert!(!text.contains("test_msgs"));
    assert_eq!(report.omitted, vec!["test_msgs/msg/Nested".to_string()]);
    assert_eq!(report.packages_scanned, 1);
    assert_eq!(report.summary.actions, 1);
    assert_eq!(report.summary.services, 3);
}

#[tokio::test]
async fn test_filter_applies_to_every_stage() {
    let root = tempdir().expect("tempdir");
    let work = tempdir().expect("tempdir");
    ament_tree(root.path());

    let config = config_for(root.path(), work.path())
        .filter(FilterRule::package("test_msgs"))
        .filter(FilterRule::interface("Add_Response"));
    let scan = rosidl_decl::scan_interfaces(&config).await.expect("scan");

    let names = reference_names(&scan);
    assert!(names.contains("demo_msgs/srv/Add_Request"));
    assert!(!names.contains("demo_msgs/srv/Add_Response"));
    assert!(scan.packages.get("test_msgs").is_none());
    assert!(names.iter().all(|name| !name.starts_with("test_msgs/")));

    // Without its response the service no longer validates.
    let report = rosidl_decl::generate_declarations(&config)
        .await
        .expect("generate");
    assert!(report
        .summary
        .incomplete
        .contains(&"demo_msgs.srv.Add".to_string()));

    // The surviving half is still a public message.
    let text = std::fs::read_to_string(&config.output).expect("read output");
    assert!(text.contains("    'demo_msgs/srv/Add_Request': demo_msgs.srv.Add_Request,\n"));
    assert!(text.contains(
        "    'demo_msgs/srv/Add_Request': demo_msgs.srv.Add_RequestConstructor,\n"
    ));
    assert!(!text.contains("'demo_msgs/srv/Add':"));
    assert!(!text.contains("AddConstructor extends ROSService"));
}

#[tokio::test]
async fn test_repeated_scans_are_stable() {
    let root = tempdir().expect("tempdir");
    let work = tempdir().expect("tempdir");
    ament_tree(root.path());
    let config = config_for(root.path(), work.path());

    let first = rosidl_decl::scan_interfaces(&config).await.expect("scan");
    let half = work.path().join("generated/srv_msg/demo_msgs/Add_Request.msg");
    let written = std::fs::read_to_string(&half).expect("request half");
    assert_eq!(written, "int64 a\nint64 b\n");

    let second = rosidl_decl::scan_interfaces(&config).await.expect("scan");
    assert_eq!(reference_names(&first), reference_names(&second));
    assert_eq!(
        first.packages.package_names().collect::<Vec<_>>(),
        second.packages.package_names().collect::<Vec<_>>()
    );
    assert_eq!(std::fs::read_to_string(&half).expect("request half"), written);
}

#[tokio::test]
async fn test_raw_walk_generation() {
    let root = tempdir().expect("tempdir");
    let work = tempdir().expect("tempdir");
    write(root.path(), "geo_msgs/msg/Vec3.msg", "float64 x\nfloat64 y\nfloat64 z\n");
    write(root.path(), "geo_msgs/srv/Reset.srv", "---\nbool ok\n");
    write(root.path(), "legacy/action/Old_Goal.msg", "int32 order\n");
    write(root.path(), "geo_msgs/README.md", "not an interface\n");

    let config = config_for(root.path(), work.path()).service_events(true);
    let report = rosidl_decl::generate_declarations(&config)
        .await
        .expect("generate");
    let text = std::fs::read_to_string(&config.output).expect("read output");

    assert!(text.contains("    'geo_msgs/msg/Vec3': geo_msgs.msg.Vec3,\n"));
    assert!(text.contains("    'geo_msgs/srv/Reset': geo_msgs.srv.ResetConstructor,\n"));
    assert!(!text.contains("Old_Goal"));

    // Service event wrapper is declared with same-subfolder references.
    assert!(text.contains("      export interface Reset_Event {\n"));
    assert!(text.contains("        request: geo_msgs.srv.Reset_Request[];\n"));
    assert!(!text.contains("'geo_msgs/srv/Reset_Event'"));

    assert_eq!(report.roots, vec![PathBuf::from(root.path())]);
    assert!(report.summary.incomplete.is_empty());
}

#[tokio::test]
async fn test_multiple_roots_first_wins() {
    let first = tempdir().expect("tempdir");
    let second = tempdir().expect("tempdir");
    let work = tempdir().expect("tempdir");
    write(first.path(), "geo_msgs/msg/Vec3.msg", "float64 x\n");
    write(second.path(), "geo_msgs/msg/Vec3.msg", "float32 x\n");
    write(second.path(), "nav_msgs/msg/Path.msg", "geo_msgs/Vec3[] points\n");

    let config = config_for(first.path(), work.path()).root(second.path());
    let scan = rosidl_decl::scan_interfaces(&config).await.expect("scan");

    let vec3 = scan
        .packages
        .get("geo_msgs")
        .expect("geo_msgs")
        .messages
        .first()
        .expect("Vec3")
        .clone();
    assert!(vec3.file_path.starts_with(first.path()));
    assert_eq!(scan.packages.get("geo_msgs").expect("geo_msgs").messages.len(), 1);
    assert!(scan.packages.get("nav_msgs").is_some());
}

#[tokio::test]
async fn test_overlapping_service_keeps_first_root_halves() {
    let first = tempdir().expect("tempdir");
    let second = tempdir().expect("tempdir");
    let work = tempdir().expect("tempdir");
    write(first.path(), "demo/srv/Add.srv", "int64 a\n---\nint64 sum\n");
    write(second.path(), "demo/srv/Add.srv", "string overlay\n---\nbool ok\n");

    let config = config_for(first.path(), work.path()).root(second.path());
    let report = rosidl_decl::generate_declarations(&config)
        .await
        .expect("generate");
    let text = std::fs::read_to_string(&config.output).expect("read output");

    assert!(text.contains(
        "      export interface Add_Request {\n\
         \x20       a: number;\n\
         \x20     }\n"
    ));
    assert!(!text.contains("overlay"));
    let half = work.path().join("generated/srv_msg/demo/Add_Request.msg");
    assert_eq!(std::fs::read_to_string(half).expect("request half"), "int64 a\n");
    assert_eq!(report.summary.services, 1);
}

#[tokio::test]
async fn test_unresolved_type_is_fatal() {
    let root = tempdir().expect("tempdir");
    let work = tempdir().expect("tempdir");
    write(root.path(), "odd_msgs/msg/Odd.msg", "int128 value\n");

    let config = config_for(root.path(), work.path());
    let err = rosidl_decl::generate_declarations(&config)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        rosidl_decl::Error::Generate(rosidl_decl::GenerateError::UnresolvedType { .. })
    ));
    assert!(!config.output.exists());
}

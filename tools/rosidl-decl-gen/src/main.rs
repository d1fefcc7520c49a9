// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ROS 2 interface declaration generator CLI
//!
//! # Usage
//!
//! ```bash
//! # Scan AMENT_PREFIX_PATH, write types/interfaces.d.ts
//! rosidl-decl-gen generate
//!
//! # Explicit roots, service event messages, JSON manifest
//! rosidl-decl-gen generate --root /opt/ros/jazzy --root ./install \
//!     --service-events --manifest out/manifest.json
//!
//! # Discovery only
//! rosidl-decl-gen scan --root /opt/ros/jazzy --json
//!
//! # Using configuration file
//! rosidl-decl-gen generate --config rosidl-decl.toml
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rosidl_decl::{FilterRule, GeneratorConfig, ScanResult};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ROS 2 interface declaration generator
#[derive(Parser, Debug)]
#[command(name = "rosidl-decl-gen")]
#[command(about = "Discover ROS 2 interfaces and generate typed declarations")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan roots and write the declaration file
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Declaration output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Staging directory for split service messages
        #[arg(long)]
        work_dir: Option<PathBuf>,

        /// Name of the declared module
        #[arg(long = "module")]
        module_name: Option<String>,

        /// Also declare <Service>_Event messages
        #[arg(long)]
        service_events: bool,

        /// Write a JSON generation manifest
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Scan roots and list discovered packages
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the full package map as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "rosidl-decl.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    ValidateConfig {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Installation root to scan (repeatable, defaults to AMENT_PREFIX_PATH)
    #[arg(short, long = "root")]
    roots: Vec<PathBuf>,
}

impl SourceArgs {
    /// Configuration file (or defaults) with command-line roots applied.
    fn load(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => GeneratorConfig::default(),
        };
        if !self.roots.is_empty() {
            config.roots = self.roots.clone();
        }
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = run(cli.command).await {
        eprintln!("[ERROR] {:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Generate {
            source,
            output,
            work_dir,
            module_name,
            service_events,
            manifest,
        } => {
            let mut config = source.load()?;
            if let Some(output) = output {
                config = config.output(output);
            }
            if let Some(work_dir) = work_dir {
                config = config.work_dir(work_dir);
            }
            if let Some(module_name) = module_name {
                config = config.module_name(module_name);
            }
            if service_events {
                config = config.service_events(true);
            }
            cmd_generate(config, manifest).await
        }
        Commands::Scan { source, json } => cmd_scan(source.load()?, json).await,
        Commands::GenConfig { output } => cmd_gen_config(output),
        Commands::ValidateConfig { config } => cmd_validate(config),
    }
}

async fn cmd_generate(config: GeneratorConfig, manifest: Option<PathBuf>) -> anyhow::Result<()> {
    tracing::info!("Generating declarations for module '{}'", config.module_name);
    let report = rosidl_decl::generate_declarations(&config)
        .await
        .context("Declaration generation failed")?;

    report.summary();

    if let Some(path) = manifest {
        report
            .write_manifest(&path)
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;
        println!("Manifest written to {}", path.display());
    }
    Ok(())
}

async fn cmd_scan(config: GeneratorConfig, json: bool) -> anyhow::Result<()> {
    let result = rosidl_decl::scan_interfaces(&config)
        .await
        .context("Scan failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.packages)?);
    } else {
        print_scan(&result);
    }
    Ok(())
}

fn print_scan(result: &ScanResult) {
    println!(
        "{:<40} {:>8} {:>8} {:>8}",
        "PACKAGE", "MESSAGES", "SERVICES", "ACTIONS"
    );
    for record in result.packages.iter() {
        println!(
            "{:<40} {:>8} {:>8} {:>8}",
            record.package_name,
            record.messages.len(),
            record.services.len(),
            record.actions.len()
        );
    }
    println!();
    println!(
        "{} package(s), {} interface(s), {} filtered",
        result.packages.len(),
        result.packages.reference_count(),
        result.omitted.len()
    );
}

fn example_config() -> GeneratorConfig {
    GeneratorConfig::default()
        .root("/opt/ros/jazzy")
        .filter(FilterRule::package("test_msgs").with_interface("Builtins|Nested"))
        .filter(FilterRule::package("rosbag2_.*"))
}

fn cmd_gen_config(output: PathBuf) -> anyhow::Result<()> {
    let toml_str = toml::to_string_pretty(&example_config())?;

    // Add comments
    let content = format!(
        r#"# rosidl-decl configuration
# Generated by rosidl-decl-gen gen-config
# Leave `roots` empty to scan AMENT_PREFIX_PATH.

{}
"#,
        toml_str
    );

    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> anyhow::Result<()> {
    let config = GeneratorConfig::from_file(&config_path)
        .with_context(|| format!("Configuration invalid: {}", config_path.display()))?;

    println!("Configuration valid!");
    println!();
    println!("Module:  {}", config.module_name);
    println!("Output:  {}", config.output.display());
    if config.roots.is_empty() {
        println!("Roots:   (AMENT_PREFIX_PATH)");
    } else {
        for root in &config.roots {
            println!("Root:    {}", root.display());
        }
    }
    println!("Filters: {}", config.filters.len());
    for (i, rule) in config.filters.iter().enumerate() {
        println!(
            "  [{}] package={} interface={}",
            i,
            rule.package.as_deref().unwrap_or("*"),
            rule.interface.as_deref().unwrap_or("*")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "rosidl-decl-gen",
            "generate",
            "--root",
            "/opt/ros/jazzy",
            "--root",
            "/ws/install",
            "--module",
            "demo",
            "--service-events",
        ])
        .expect("parse");

        match cli.command {
            Commands::Generate {
                source,
                module_name,
                service_events,
                ..
            } => {
                assert_eq!(source.roots.len(), 2);
                assert_eq!(module_name.as_deref(), Some("demo"));
                assert!(service_events);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_roots_override_config_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "roots = [\"/from/file\"]\nmodule_name = \"filed\"\n")
            .expect("write");

        let source = SourceArgs {
            config: Some(path),
            roots: vec![PathBuf::from("/from/cli")],
        };
        let config = source.load().expect("load");
        assert_eq!(config.roots, vec![PathBuf::from("/from/cli")]);
        assert_eq!(config.module_name, "filed");
    }

    #[test]
    fn test_gen_config_round_trips() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("rosidl-decl.toml");
        cmd_gen_config(path.clone()).expect("gen-config");

        let config = GeneratorConfig::from_file(&path).expect("valid");
        assert_eq!(config.filters.len(), 2);
        assert!(cmd_validate(path).is_ok());
    }
}

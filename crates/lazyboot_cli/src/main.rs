//! Maintenance entry point for lazyboot hosts.
//!
//! # Responsibility
//! - Inspect or clear a compiled module manifest cache.
//! - Validate a boot config and its logging settings.
//! - Keep output deterministic for scripting.

use clap::{Parser, Subcommand};
use lazyboot_core::{init_from_config, BootConfig, ManifestStore};
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lazyboot")]
#[command(about = "Inspect lazyboot module manifests and boot configs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the core crate version
    Version,

    /// Print a compiled manifest and its module counts
    Inspect {
        /// Manifest cache file
        manifest: PathBuf,
    },

    /// Delete a compiled manifest so the next boot recompiles it
    Clear {
        /// Manifest cache file
        manifest: PathBuf,
    },

    /// Validate a boot config and start logging when it names a log_dir
    Check {
        /// Boot config JSON file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<Vec<String>, String> {
    match command {
        Command::Version => Ok(vec![format!(
            "lazyboot_core version={}",
            lazyboot_core::core_version()
        )]),
        Command::Inspect { manifest } => inspect(&manifest),
        Command::Clear { manifest } => clear(&manifest),
        Command::Check { config } => check(&config),
    }
}

fn inspect(path: &Path) -> Result<Vec<String>, String> {
    let store = ManifestStore::new(path);
    let Some(manifest) = store.load().map_err(|err| err.to_string())? else {
        return Ok(vec![format!(
            "manifest={} status=missing",
            store.path().display()
        )]);
    };

    manifest.check_partition().map_err(|err| err.to_string())?;
    let rendered = serde_json::to_string_pretty(&manifest).map_err(|err| err.to_string())?;
    Ok(vec![
        rendered,
        format!(
            "manifest={} status=ok modules={} eager={} deferred_capabilities={}",
            store.path().display(),
            manifest.descriptors.len(),
            manifest.eager.len(),
            manifest.deferred.len()
        ),
    ])
}

fn clear(path: &Path) -> Result<Vec<String>, String> {
    let store = ManifestStore::new(path);
    let removed = store.clear().map_err(|err| err.to_string())?;
    let status = if removed { "cleared" } else { "missing" };
    Ok(vec![format!(
        "manifest={} status={status}",
        store.path().display()
    )])
}

fn check(path: &Path) -> Result<Vec<String>, String> {
    let config = BootConfig::from_json_file(path).map_err(|err| err.to_string())?;
    let logging = init_from_config(&config).map_err(|err| err.to_string())?;
    info!(
        "event=config_check module=cli status=ok config={} modules={}",
        path.display(),
        config.modules.len()
    );
    Ok(vec![format!(
        "config={} status=ok manifest={} modules={} log_level={} logging={}",
        path.display(),
        config.manifest_path.display(),
        config.modules.len(),
        config.log_level,
        if logging { "on" } else { "off" }
    )])
}

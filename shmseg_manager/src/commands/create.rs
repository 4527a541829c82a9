//! `shmseg create`
//!
//! Creates a segment and keeps it alive until Ctrl+C so other processes can attach.
//! Dropping the handle on exit unlinks the name.

use anyhow::{bail, Context, Result};
use colored::*;
use shmseg_core::{AccessMode, ReadOnly, ReadWrite, SegmentConfig, SharedMemory};
use std::path::PathBuf;
use std::sync::mpsc;

/// Command-line overrides for a segment config
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    pub name: Option<String>,
    pub config: Option<PathBuf>,
    pub size: Option<usize>,
    pub shared: bool,
    pub mode: Option<u32>,
    pub read_only: bool,
}

/// Merge the config file (if any) with command-line flags; flags win
pub fn resolve_config(args: &CreateArgs) -> Result<SegmentConfig> {
    let mut config = match (&args.config, &args.name) {
        (Some(path), _) => SegmentConfig::load(path)
            .with_context(|| format!("Failed to load segment config {}", path.display()))?,
        (None, Some(name)) => SegmentConfig::new(name.clone()),
        (None, None) => bail!("a segment name or --config file is required"),
    };

    if let Some(name) = &args.name {
        config.name = name.clone();
    }
    if let Some(size) = args.size {
        config.size = size;
    }
    if args.shared {
        config.exclusive = false;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if args.read_only {
        config.read_only = true;
    }

    config.validate()?;
    Ok(config)
}

/// Run the create command
pub fn run_create(args: CreateArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    tracing::debug!(?config, "creating segment");

    if config.read_only {
        let shm = SharedMemory::<ReadOnly>::create_as(&config.name, config.create_options())
            .with_context(|| format!("Failed to create '{}'", config.name))?;
        hold(shm)
    } else {
        let shm = SharedMemory::<ReadWrite>::create_as(&config.name, config.create_options())
            .with_context(|| format!("Failed to create '{}'", config.name))?;
        hold(shm)
    }
}

fn hold<M: AccessMode>(shm: SharedMemory<M>) -> Result<()> {
    println!(
        "{} Created {} ({} bytes)",
        "✓".green(),
        shm.name().yellow().bold(),
        shm.size()
    );
    println!(
        "  Attach with: {}",
        format!("shmseg inspect {}", shm.name()).yellow()
    );
    println!("  Press {} to remove the segment and exit", "Ctrl+C".cyan());

    wait_for_interrupt()?;

    let name = shm.name().to_string();
    drop(shm);
    println!("{} Removed {}", "✓".green(), name.yellow());
    Ok(())
}

fn wait_for_interrupt() -> Result<()> {
    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("Failed to install Ctrl+C handler")?;

    rx.recv().context("Ctrl+C handler stopped unexpectedly")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_without_config() {
        let args = CreateArgs {
            name: Some("/seg_a".into()),
            size: Some(256),
            shared: true,
            mode: Some(0o640),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.name, "/seg_a");
        assert_eq!(config.size, 256);
        assert!(!config.exclusive);
        assert_eq!(config.mode, 0o640);
        assert!(!config.read_only);
    }

    #[test]
    fn test_name_or_config_required() {
        assert!(resolve_config(&CreateArgs::default()).is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let args = CreateArgs {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(resolve_config(&args).is_err());
    }
}

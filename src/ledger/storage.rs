use super::types::{Ledger, LEDGER_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default ledger path for a league (~/.config/fairway/<league>.json)
pub fn get_ledger_path(league: &str) -> PathBuf {
    crate::config::get_config_dir().join(format!("{}.json", league))
}

/// Load a league ledger from a JSON file
///
/// If the file doesn't exist, returns a new empty ledger for `league`.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_ledger(path: &Path, league: &str) -> Result<Ledger> {
    if !path.exists() {
        debug!(path = %path.display(), "no ledger on disk, starting empty");
        return Ok(Ledger::new(league));
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open ledger at {}", path.display()))?;

    let ledger: Ledger = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load ledger from {}", path.display()))?;

    if ledger.version != LEDGER_VERSION {
        anyhow::bail!("Unsupported ledger version: {}", ledger.version);
    }

    debug!(
        path = %path.display(),
        players = ledger.players.len(),
        rounds = ledger.rounds.len(),
        "loaded ledger"
    );
    Ok(ledger)
}

/// Save a ledger to a JSON file atomically
///
/// The file is never left half-written. Parent directories are created.
pub fn save_ledger(path: &Path, ledger: &Ledger) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, ledger).context("Failed to serialize ledger")?;

    file.commit().context("Failed to save ledger")?;

    debug!(path = %path.display(), "saved ledger");
    Ok(())
}

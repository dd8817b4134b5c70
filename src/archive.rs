//! Filing of statements into a documents tree, arranged by account:
//! `<root>/Assets/Monzo/Current/2023-01-31.monzo.statement.json`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use log::debug;

const ACCOUNT_SEPARATOR: char = ':';
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns where a statement for `account`, ending on `date`, is archived
/// within `root`.
pub fn archive_path(root: &Path, account: &str, date: NaiveDate, file_name: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(
        account
            .split(ACCOUNT_SEPARATOR)
            .filter(|component| !component.is_empty()),
    );
    path.push(format!("{}.{}", date.format(DATE_FORMAT), file_name));
    path
}

/// Moves the file at `from` to `to`, creating any missing parent directories.
/// Refuses to replace an existing file.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        bail!("not moving {:?}, {:?} already exists", from, to);
    }
    if let Some(dir) = to.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating directory {:?}", dir))?;
    }
    if let Err(e) = std::fs::rename(from, to) {
        // Renaming fails across filesystems.
        debug!("renaming {:?} to {:?} failed ({}), copying instead", from, to, e);
        std::fs::copy(from, to).with_context(|| format!("copying {:?} to {:?}", from, to))?;
        std::fs::remove_file(from).with_context(|| format!("removing {:?}", from))?;
    }
    Ok(())
}

//! Output-archive emission.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::{write::FileOptions, ZipWriter};

use crate::Result;

/// Write the rewritten classes into a single archive, one `<name>.class` entry
/// per class, in the order given (discovery order from analysis).
///
/// Parent directories are created as needed. Any I/O or archive failure here is
/// fatal: the output is an explicitly required product of the run.
///
/// # Errors
/// Returns [`crate::Error::FileError`] or [`crate::Error::ArchiveError`] if the
/// archive cannot be created or written.
pub fn write_archive(path: &Path, classes: &[(String, Vec<u8>)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = ZipWriter::new(file);
    for (name, bytes) in classes {
        writer.start_file(format!("{name}.class"), FileOptions::default())?;
        writer.write_all(bytes)?;
    }
    writer.finish()?;
    Ok(())
}

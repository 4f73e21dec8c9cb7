//! Line reading and fragment merging for the Odoo configuration file.
//!
//! The base configuration is a copy of the template shipped with the image.
//! Fragment files dropped into the fragment directory are appended to it, each
//! one preceded by a blank separator line, before the result is parsed as INI.

use crate::error::EntrypointError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// File name inside the fragment directory that holds the template itself.
/// It is copied separately and must not be appended twice.
pub const RESERVED_FRAGMENT: &str = "openerp_serverrc";

/// Read a text file and return its non-blank lines, trimmed, in file order.
pub fn read_lines(path: &Path) -> Result<Vec<String>, EntrypointError> {
    let contents = read_text(path)?;
    Ok(contents
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Read a whole file as text. Invalid UTF-8 sequences become U+FFFD instead
/// of failing, so a stray latin-1 comment does not stop the boot.
pub(crate) fn read_text(path: &Path) -> Result<String, EntrypointError> {
    let bytes = fs::read(path).map_err(|e| EntrypointError::file(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Result of [`merge_fragments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The fragment directory does not exist; the base file was not touched.
    Skipped,
    /// The base file was rewritten. `fragments` counts files that contributed lines.
    Merged { fragments: usize },
}

/// List the fragment files of `dir`: regular files at depth one, sorted by name,
/// without the reserved template name.
pub fn fragment_files(dir: &Path) -> Result<Vec<PathBuf>, EntrypointError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            EntrypointError::file(path, e.into())
        })?;
        if !entry.file_type().is_file() || entry.file_name() == RESERVED_FRAGMENT {
            continue;
        }
        files.push(entry.into_path());
    }

    Ok(files)
}

/// Append every fragment file in `fragment_dir` to the file at `base`.
///
/// A missing fragment directory is not an error: the base file is left as is.
/// Any failure reading the base or a fragment, or writing the result, aborts.
pub fn merge_fragments(base: &Path, fragment_dir: &Path) -> Result<MergeOutcome, EntrypointError> {
    if !fragment_dir.is_dir() {
        debug!(
            fragment_dir = %fragment_dir.display(),
            "Fragment directory not found, skipping merge"
        );
        return Ok(MergeOutcome::Skipped);
    }

    let mut lines = read_lines(base)?;
    let mut fragments = 0;

    for fragment in fragment_files(fragment_dir)? {
        let fragment_lines = read_lines(&fragment)?;
        if fragment_lines.is_empty() {
            continue;
        }
        debug!(
            fragment = %fragment.display(),
            lines = fragment_lines.len(),
            "Appending configuration fragment"
        );
        lines.push(String::new());
        lines.extend(fragment_lines);
        fragments += 1;
    }

    info!(config = %base.display(), fragments, "Saving merged Odoo config file");
    write_config_file(base, &lines.join("\n"))?;

    Ok(MergeOutcome::Merged { fragments })
}

/// Overwrite `path` with `contents`, leaving it world-readable and owner-writable.
pub(crate) fn write_config_file(path: &Path, contents: &str) -> Result<(), EntrypointError> {
    fs::write(path, contents).map_err(|e| EntrypointError::file(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644))
            .map_err(|e| EntrypointError::file(path, e))?;
    }

    Ok(())
}

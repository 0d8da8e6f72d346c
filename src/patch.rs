use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{PatchError, SyncError};

/// Closing lines of the last hand-written entry plus the comment that opens
/// the imported section.
pub const ANCHOR: &str = concat!(
    "                sysop: \"Floodgap\"\n",
    "            },\n",
    "            // BBSes scraped from telnetbbsguide.com\n",
);

/// Closing bracket of the BBS array.
pub const TERMINATOR: &str = "        ];";

/// Page-level tag whose count must survive a splice unchanged.
pub const STRUCTURE_MARKER: &str = "<h1>";

/// Byte range of the imported section: after the anchor, up to the terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn locate(text: &str) -> Result<Self, PatchError> {
        let anchor_at = text.find(ANCHOR).ok_or(PatchError::AnchorNotFound)?;
        let occurrences = text.matches(ANCHOR).count();
        if occurrences > 1 {
            return Err(PatchError::AnchorNotUnique(occurrences));
        }

        let start = anchor_at + ANCHOR.len();
        let end = text[start..]
            .find(TERMINATOR)
            .map(|rel| start + rel)
            .ok_or(PatchError::TerminatorNotFound)?;
        Ok(Region { start, end })
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Replace the imported section of `text` with `section`.
///
/// Everything outside the region is carried over byte for byte; whatever was
/// imported before is discarded.
pub fn splice(text: &str, section: &str) -> Result<String, PatchError> {
    let region = Region::locate(text)?;

    let mut out = String::with_capacity(text.len() - (region.end - region.start) + section.len());
    out.push_str(&text[..region.start]);
    out.push_str(section);
    out.push_str(&text[region.end..]);

    let before = text.matches(STRUCTURE_MARKER).count();
    let after = out.matches(STRUCTURE_MARKER).count();
    if before != after {
        return Err(PatchError::StructureChanged {
            marker: STRUCTURE_MARKER,
            before,
            after,
        });
    }
    Ok(out)
}

/// Number of entries currently in the imported section.
pub fn imported_count(text: &str) -> Result<usize, PatchError> {
    let region = Region::locate(text)?;
    Ok(region.slice(text).matches("\"name\": ").count())
}

/// Read `path`, splice in `section` and, unless `dry_run`, replace the file.
///
/// The new contents go to a sibling temp file first and are renamed over the
/// target, so the target is either fully rewritten or untouched. Symlinks are
/// followed and the file keeps its permissions.
pub fn apply(path: &Path, section: &str, dry_run: bool) -> Result<(), SyncError> {
    let io_err = |source: std::io::Error| SyncError::Io {
        path: path.to_path_buf(),
        source,
    };

    let current = fs::read_to_string(path).map_err(io_err)?;
    let updated = splice(&current, section).map_err(|source| SyncError::Patch {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Spliced {} -> {} bytes", current.len(), updated.len());

    if dry_run {
        return Ok(());
    }

    // Write next to the real file so a symlinked target stays a symlink.
    let target = fs::canonicalize(path).map_err(io_err)?;
    let permissions = fs::metadata(&target).map_err(io_err)?.permissions();
    let tmp = target.with_extension("html.tmp");

    let written = fs::write(&tmp, &updated)
        .and_then(|()| fs::set_permissions(&tmp, permissions))
        .and_then(|()| fs::rename(&tmp, &target));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(e));
    }
    Ok(())
}

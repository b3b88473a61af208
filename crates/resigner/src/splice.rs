use std::fs;
use std::io::{self, Write};
use std::path::Path;

use memchr::memmem;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ResignError;
use crate::scanner::message_lines;

/// Result of rewriting a message in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spliced {
    pub content: Vec<u8>,
    /// Number of lines in which the signature was replaced.
    pub lines_rewritten: usize,
}

/// Replace `marker + old` with `marker + new`, first occurrence per line.
///
/// Lines without the search string are copied through unchanged, including
/// their terminators.
pub fn splice_signature(message: &[u8], marker: &[u8], old: &[u8], new: &[u8]) -> Spliced {
    let search = [marker, old].concat();
    let replace = [marker, new].concat();
    let finder = memmem::Finder::new(&search);

    let mut content = Vec::with_capacity(message.len() + new.len());
    let mut lines_rewritten = 0;
    for line in message_lines(message) {
        match finder.find(line) {
            Some(found) => {
                content.extend_from_slice(&line[..found]);
                content.extend_from_slice(&replace);
                content.extend_from_slice(&line[found + search.len()..]);
                lines_rewritten += 1;
            }
            None => content.extend_from_slice(line),
        }
    }

    Spliced {
        content,
        lines_rewritten,
    }
}

/// Replace the file at `target` with `content`.
///
/// The content is staged in a temporary file inside `staging_dir` (or the
/// target's own directory), synced, and renamed over the target. If any step
/// fails the target keeps its previous bytes.
pub fn write_staged(target: &Path, staging_dir: Option<&Path>, content: &[u8]) -> Result<(), ResignError> {
    stage_and_persist(target, staging_dir, content).map_err(|source| ResignError::SpliceIo {
        path: target.to_path_buf(),
        source,
    })
}

fn stage_and_persist(target: &Path, staging_dir: Option<&Path>, content: &[u8]) -> io::Result<()> {
    let dir = match staging_dir {
        Some(dir) => dir,
        None => match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        },
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(content)?;
    staged.as_file().sync_all()?;

    // Keep the target's permissions rather than the temp file's 0600.
    if let Ok(metadata) = fs::metadata(target) {
        fs::set_permissions(staged.path(), metadata.permissions())?;
    }

    debug!(staged = %staged.path().display(), target = %target.display(), "persisting staged message");
    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}

//! Directory traversal.
//!
//! Uses the `ignore` crate to walk the tree depth-first with a fixed
//! lexicographic sort of file names within each directory, so repeated runs
//! over an unchanged tree visit candidates in the same order. Directories
//! whose name appears in the rule set's excluded list are pruned without
//! being descended into; symlinks are never followed.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;

use crate::filter::{FilterResult, RuleSet};

/// Errors that can occur during directory walking.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("cannot list {path}: {source}")]
    Unlistable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file that passed the rule set and awaits emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute (or root-joined) path, used for I/O.
    pub path: PathBuf,
    /// Path relative to the scan root, used for display.
    pub relative: PathBuf,
}

impl Candidate {
    /// The relative path with forward slashes, for section headers.
    pub fn display_path(&self) -> String {
        let s = self.relative.to_string_lossy();
        if std::path::MAIN_SEPARATOR == '/' {
            s.into_owned()
        } else {
            s.replace(std::path::MAIN_SEPARATOR, "/")
        }
    }
}

/// Walk `root` and yield candidate files in deterministic order.
///
/// Directory-level failures (a subtree that cannot be listed) surface as
/// `Err` items so the caller can warn and continue; they never terminate
/// the iterator. A missing or non-directory root yields a single `Err`.
pub fn select<'a>(
    root: &Path,
    rules: &'a RuleSet,
) -> impl Iterator<Item = Result<Candidate, WalkError>> + 'a {
    let root = root.to_path_buf();

    if !root.exists() {
        return Either::Left(std::iter::once(Err(WalkError::NotFound { path: root })));
    }
    if !root.is_dir() {
        return Either::Left(std::iter::once(Err(WalkError::NotADirectory { path: root })));
    }

    let mut builder = WalkBuilder::new(&root);
    builder
        // Selection is governed entirely by the rule set, not by git state
        // or hidden-file conventions.
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    {
        let rules = rules.clone();
        builder.filter_entry(move |entry| {
            // The root itself is never pruned, even if its own name matches.
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            if !is_dir {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map_or(true, |name| !rules.is_excluded_dir(name))
        });
    }

    let walker = builder.build();

    Either::Right(walker.filter_map(move |result| match result {
        Ok(entry) => {
            // Only regular files become candidates; directories, symlinks,
            // and special files are passed over silently.
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return None;
            }
            let path = entry.into_path();
            match rules.check(&path) {
                FilterResult::Accept(_) => {
                    let relative = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();
                    Some(Ok(Candidate { path, relative }))
                }
                FilterResult::Reject(_) => None,
            }
        }
        Err(err) => match err {
            ignore::Error::WithPath { path, err } => match *err {
                ignore::Error::Io(io_err) => {
                    Some(Err(WalkError::Unlistable { path, source: io_err }))
                }
                _ => None,
            },
            ignore::Error::Io(io_err) => Some(Err(WalkError::Unlistable {
                path: PathBuf::from("<unknown>"),
                source: io_err,
            })),
            _ => None,
        },
    }))
}

/// Simple Either type to avoid adding an itertools dependency.
enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L, R, T> Iterator for Either<L, R>
where
    L: Iterator<Item = T>,
    R: Iterator<Item = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Either::Left(l) => l.next(),
            Either::Right(r) => r.next(),
        }
    }
}

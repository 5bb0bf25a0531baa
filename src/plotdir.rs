//! Plot directory model
//!
//! A [`PlotDir`] owns the plot files found directly under one path plus an
//! ordered list of related directories, additional physical locations that
//! are logically merged into it. Scans are shallow at the filesystem level;
//! recursion only happens across related directories. All per-file failures
//! are soft: the offending path is logged and skipped, the scan continues.
//!
//! Scans and rescans assume a single writer per instance; concurrent readers
//! of a stable directory are fine since accessors never mutate.

use crate::plotfile::{PlotCheckResult, PlotFile};
use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Access pattern of the medium a directory lives on. Only a tag for the
/// external read scheduler; nothing in this crate behaves differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirKind {
    /// Files are read by at most one reader at a time (spinning disk)
    Sequential,
    /// Files can be read by several readers at once (SSD, RAID)
    Parallel,
}

/// One plot directory and its logically merged related directories.
#[derive(Debug)]
pub struct PlotDir {
    path: PathBuf,
    kind: DirKind,
    total_size: u64,
    plotfiles: Vec<Arc<PlotFile>>,
    related_dirs: Vec<PlotDir>,
    hash: String,
}

impl PlotDir {
    /// Create a plot directory and perform the initial scan.
    pub fn new(path: impl Into<PathBuf>, kind: DirKind) -> Self {
        Self::with_related(path, Vec::<PathBuf>::new(), kind)
    }

    /// Create a plot directory with related directories, each becoming a
    /// child of the same kind, and perform the initial scan of all of them.
    pub fn with_related(
        path: impl Into<PathBuf>,
        related: Vec<impl Into<PathBuf>>,
        kind: DirKind,
    ) -> Self {
        let path = path.into();
        let mut dir = Self {
            path: path.clone(),
            kind,
            total_size: 0,
            plotfiles: Vec::new(),
            related_dirs: Vec::new(),
            hash: String::new(),
        };
        dir.add_plot_location(&path);
        for related_path in related {
            dir.related_dirs.push(PlotDir::new(related_path, kind));
        }
        dir.recalculate_hash();
        dir
    }

    /// Path of the directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Kind tag of the directory
    pub fn kind(&self) -> DirKind {
        self.kind
    }

    /// Sum of the plot file sizes directly inside this directory, in bytes
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Related directories, in configuration order
    pub fn related_dirs(&self) -> &[PlotDir] {
        &self.related_dirs
    }

    /// Fingerprint of the recursive path set as of the last scan
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// All plot files inside this directory; with `recursive`, also the
    /// files of every related directory, depth-first in configuration order.
    /// Builds a fresh aggregate on every call.
    pub fn plotfiles(&self, recursive: bool) -> Vec<Arc<PlotFile>> {
        let mut files = self.plotfiles.clone();
        if recursive {
            for related in &self.related_dirs {
                files.extend(related.plotfiles(true));
            }
        }
        files
    }

    /// Drop all state and search the directory tree again.
    ///
    /// Files that changed, vanished or turned invalid since the last scan
    /// simply drop out; the fingerprint is rebuilt afterwards.
    pub fn rescan(&mut self) {
        self.plotfiles.clear();
        self.total_size = 0;

        let path = self.path.clone();
        self.add_plot_location(&path);

        for related in &mut self.related_dirs {
            related.rescan();
        }

        self.recalculate_hash();
    }

    /// Add a single plot file or every file of a directory.
    ///
    /// Fails softly (warn log, `false`) when the path is empty or does not
    /// exist. Individual rejected files inside an enumerable directory do
    /// not fail the call.
    pub fn add_plot_location(&mut self, file_or_path: &Path) -> bool {
        if file_or_path.as_os_str().is_empty() {
            warn!(path = %file_or_path.display(), "invalid plot file/dir (syntax), skipping it");
            return false;
        }

        let metadata = match fs::metadata(file_or_path) {
            Ok(metadata) => metadata,
            Err(error) => {
                warn!(
                    path = %file_or_path.display(),
                    %error,
                    "plot file/dir does not exist or is unreadable"
                );
                return false;
            }
        };

        if metadata.is_file() {
            return self.add_plot_file(file_or_path).is_some();
        }

        if metadata.is_dir() {
            let entries = match fs::read_dir(file_or_path) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(path = %file_or_path.display(), %error, "cannot enumerate plot dir");
                    return false;
                }
            };
            // sort the entries so the fingerprint does not depend on the
            // enumeration order the OS happens to return
            let mut files: Vec<PathBuf> = entries
                .flatten()
                .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
                .map(|entry| entry.path())
                .collect();
            files.sort();
            for file in &files {
                self.add_plot_file(file);
            }
            return true;
        }

        false
    }

    /// Validate and insert one plot file, deduplicating by exact path.
    ///
    /// Returns the shared handle on success, the existing handle when the
    /// path is already known, `None` otherwise.
    pub fn add_plot_file(&mut self, file: &Path) -> Option<Arc<PlotFile>> {
        let path = file.to_string_lossy().into_owned();
        let size = fs::metadata(file).map(|m| m.len()).unwrap_or(0);

        let reason = match PlotFile::validate(&path, size) {
            PlotCheckResult::Ok => {
                if let Some(existing) = self.plotfiles.iter().find(|p| p.path() == path) {
                    return Some(Arc::clone(existing));
                }
                let plotfile = Arc::new(PlotFile::parse(path, size).ok()?);
                self.plotfiles.push(Arc::clone(&plotfile));
                self.total_size += size;
                return Some(plotfile);
            }
            PlotCheckResult::EmptyParameter => return None,
            PlotCheckResult::Incomplete => "the plot file is incomplete",
            PlotCheckResult::InvalidParameter => "the plot file has invalid parameters",
            PlotCheckResult::WrongStaggersize => "the plot file has an invalid stagger size",
        };

        warn!(path = %path, reason, "found an invalid plot file, skipping it");
        None
    }

    /// Rebuild the fingerprint from the recursive file list.
    ///
    /// Concatenates every path in enumeration order and stores the SHA-1 of
    /// the concatenation as lowercase hex. A change-detection signal only,
    /// not a content hash.
    pub fn recalculate_hash(&mut self) {
        let mut sha = Sha1::new();
        for plotfile in self.plotfiles(true) {
            sha.update(plotfile.path().as_bytes());
        }
        self.hash = hex::encode(sha.finalize());
    }
}

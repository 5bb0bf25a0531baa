//! Plot directory configuration
//!
//! Models the `plots` section of a miner configuration file. An entry is
//! either a bare string (a sequential directory) or an object selecting the
//! kind and optionally listing related directories:
//!
//! ```json
//! {
//!   "plots": [
//!     "/mnt/disk1",
//!     { "path": "/mnt/ssd", "type": "parallel" },
//!     { "path": ["/mnt/a", "/mnt/b", "/mnt/c"], "type": "sequential" }
//!   ]
//! }
//! ```
//!
//! With an array path, the first element is the root and the rest become its
//! related directories. Invalid entries are logged and skipped; they never
//! fail the load.

use crate::plotdir::{DirKind, PlotDir};
use crate::Result;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

#[derive(Debug, Deserialize)]
struct PlotsSection {
    #[serde(default)]
    plots: Vec<Value>,
}

/// One explicit plot directory entry
#[derive(Debug, Deserialize)]
struct PlotEntry {
    path: PathSpec,
    #[serde(rename = "type")]
    kind: KindSpec,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PathSpec {
    Single(String),
    Related(Vec<String>),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum KindSpec {
    Sequential,
    Parallel,
}

impl From<KindSpec> for DirKind {
    fn from(kind: KindSpec) -> Self {
        match kind {
            KindSpec::Sequential => DirKind::Sequential,
            KindSpec::Parallel => DirKind::Parallel,
        }
    }
}

/// Build and scan the plot directories described by a configuration string.
///
/// Fails only when the document itself is not valid JSON; individual bad
/// entries are logged and dropped.
pub fn load_plot_dirs(json: &str) -> Result<Vec<PlotDir>> {
    let section: PlotsSection = serde_json::from_str(json)?;
    let mut dirs = Vec::new();

    for value in section.plots {
        if let Value::String(path) = &value {
            dirs.push(PlotDir::new(path, DirKind::Sequential));
            continue;
        }

        let entry: PlotEntry = match serde_json::from_value(value.clone()) {
            Ok(entry) => entry,
            Err(err) => {
                error!(entry = %value, %err, "invalid plot dir entry, skipping it");
                continue;
            }
        };

        let kind = DirKind::from(entry.kind);
        match entry.path {
            PathSpec::Single(path) => dirs.push(PlotDir::new(path, kind)),
            PathSpec::Related(paths) => {
                let mut paths = paths.into_iter();
                match paths.next() {
                    Some(root) => {
                        dirs.push(PlotDir::with_related(root, paths.collect::<Vec<String>>(), kind))
                    }
                    None => error!("empty path list given as plot dir, skipping it"),
                }
            }
        }
    }

    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_string_entry_is_sequential() {
        let tmp = TempDir::new().unwrap();
        let json = format!(r#"{{ "plots": [{:?}] }}"#, tmp.path().to_string_lossy());
        let dirs = load_plot_dirs(&json).unwrap();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].kind(), DirKind::Sequential);
    }

    #[test]
    fn test_object_entry_with_related_dirs() {
        let root = TempDir::new().unwrap();
        let extra = TempDir::new().unwrap();
        let json = format!(
            r#"{{ "plots": [{{ "path": [{:?}, {:?}], "type": "parallel" }}] }}"#,
            root.path().to_string_lossy(),
            extra.path().to_string_lossy()
        );
        let dirs = load_plot_dirs(&json).unwrap();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].kind(), DirKind::Parallel);
        assert_eq!(dirs[0].related_dirs().len(), 1);
        assert_eq!(dirs[0].related_dirs()[0].kind(), DirKind::Parallel);
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let json = format!(
            r#"{{ "plots": [42, {{ "path": {:?}, "type": "banana" }}, {:?}] }}"#,
            tmp.path().to_string_lossy(),
            tmp.path().to_string_lossy()
        );
        let dirs = load_plot_dirs(&json).unwrap();
        assert_eq!(dirs.len(), 1);
    }

    #[test]
    fn test_missing_section_is_empty() {
        assert!(load_plot_dirs("{}").unwrap().is_empty());
    }

    #[test]
    fn test_broken_document_fails() {
        assert!(load_plot_dirs("not json").is_err());
    }
}

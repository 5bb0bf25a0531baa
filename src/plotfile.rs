//! Plot file identity and geometry
//!
//! A [`PlotFile`] is not the physical file but the metadata encoded in its
//! canonical name, `{accountId}_{nonceStart}_{nonces}_{staggerSize}`, plus
//! the size reported by the filesystem. Instances are immutable; directory
//! views share them behind `Arc`.

use crate::{Error, Result, PLOT_SIZE};
use std::fmt;
use std::path::Path;

/// Validation outcome for a candidate plot file.
///
/// Only `Ok` results in insertion into a directory; every other outcome is
/// logged with the path and reason, except `EmptyParameter` which is skipped
/// silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotCheckResult {
    /// Well-formed, complete plot file
    Ok,
    /// No path given
    EmptyParameter,
    /// Declared nonce range exceeds the actual file size
    Incomplete,
    /// Name does not decode into four unsigned integers, or zero geometry
    InvalidParameter,
    /// Stagger size does not divide the nonce count
    WrongStaggersize,
}

/// Metadata of one plot file, parsed from its name and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotFile {
    path: String,
    size: u64,
    account_id: u64,
    nonce_start: u64,
    nonces: u64,
    stagger_size: u64,
}

/// Split a plot file's base name into its four decimal fields.
fn parse_name(path: &str) -> Option<(u64, u64, u64, u64)> {
    let name = Path::new(path).file_name()?.to_str()?;
    let mut fields = name.split('_').map(|part| part.parse::<u64>().ok());
    let account_id = fields.next()??;
    let nonce_start = fields.next()??;
    let nonces = fields.next()??;
    let stagger_size = fields.next()??;
    if fields.next().is_some() {
        return None;
    }
    Some((account_id, nonce_start, nonces, stagger_size))
}

impl PlotFile {
    /// Parse a plot file from its path and externally supplied size.
    ///
    /// Fails when the base name does not decode into four unsigned 64-bit
    /// integers. Callers are expected to run [`PlotFile::validate`] first;
    /// this constructor alone does not check geometry or completeness.
    pub fn parse(path: impl Into<String>, size: u64) -> Result<Self> {
        let path = path.into();
        let (account_id, nonce_start, nonces, stagger_size) = parse_name(&path).ok_or_else(
            || Error::plot_file(&path, "expected {account}_{start}_{nonces}_{stagger}"),
        )?;
        Ok(Self {
            path,
            size,
            account_id,
            nonce_start,
            nonces,
            stagger_size,
        })
    }

    /// Five-way acceptance check for a candidate path.
    pub fn validate(path: &str, size: u64) -> PlotCheckResult {
        if path.is_empty() {
            return PlotCheckResult::EmptyParameter;
        }
        let Some((_, nonce_start, nonces, stagger_size)) = parse_name(path) else {
            return PlotCheckResult::InvalidParameter;
        };
        if nonces == 0 || stagger_size == 0 {
            return PlotCheckResult::InvalidParameter;
        }
        if nonce_start.checked_add(nonces).is_none() {
            // the nonce range must not wrap past u64::MAX
            return PlotCheckResult::InvalidParameter;
        }
        if nonces % stagger_size != 0 {
            return PlotCheckResult::WrongStaggersize;
        }
        let Some(expected) = nonces.checked_mul(PLOT_SIZE as u64) else {
            return PlotCheckResult::InvalidParameter;
        };
        if size < expected {
            return PlotCheckResult::Incomplete;
        }
        PlotCheckResult::Ok
    }

    /// Path to the plot file
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Size of the plot file in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Account id the plot file is bound to
    pub fn account_id(&self) -> u64 {
        self.account_id
    }

    /// First nonce of the plot file
    pub fn nonce_start(&self) -> u64 {
        self.nonce_start
    }

    /// Number of nonces inside the plot file
    pub fn nonces(&self) -> u64 {
        self.nonces
    }

    /// One past the last nonce of the plot file.
    ///
    /// Saturates instead of wrapping: names whose range would pass
    /// `u64::MAX` are rejected by [`PlotFile::validate`], but they still
    /// parse, and range arithmetic on them must not panic.
    pub fn nonce_end(&self) -> u64 {
        self.nonce_start.saturating_add(self.nonces)
    }

    /// Nonces per stagger block
    pub fn stagger_size(&self) -> u64 {
        self.stagger_size
    }

    /// Number of stagger blocks the file consists of
    pub fn stagger_count(&self) -> u64 {
        self.nonces / self.stagger_size
    }

    /// Size of one stagger block in bytes
    pub fn stagger_bytes(&self) -> u64 {
        self.stagger_size * PLOT_SIZE as u64
    }

    /// Size of one scoop slice across a stagger block in bytes
    pub fn stagger_scoop_bytes(&self) -> u64 {
        self.stagger_size * crate::SCOOP_SIZE as u64
    }
}

impl fmt::Display for PlotFile {
    /// Canonical name encoding; must round-trip through [`PlotFile::parse`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.account_id, self.nonce_start, self.nonces, self.stagger_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn test_parse_canonical_name() {
        let plot = PlotFile::parse("/plots/12345_0_4096_128", 0).unwrap();
        assert_eq!(plot.account_id(), 12345);
        assert_eq!(plot.nonce_start(), 0);
        assert_eq!(plot.nonces(), 4096);
        assert_eq!(plot.stagger_size(), 128);
        assert_eq!(plot.to_string(), "12345_0_4096_128");
    }

    #[test]
    fn test_derived_geometry() {
        let plot = PlotFile::parse("9_100_4096_128", 0).unwrap();
        assert_eq!(plot.stagger_count(), 32);
        assert_eq!(plot.stagger_count() * plot.stagger_size(), plot.nonces());
        assert_eq!(plot.stagger_bytes(), 128 * PLOT_SIZE as u64);
        assert_eq!(plot.stagger_scoop_bytes(), 128 * 64);
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        assert!(PlotFile::parse("/plots/12345_0_4096", 0).is_err());
        assert!(PlotFile::parse("/plots/12345_0_4096_128_9", 0).is_err());
        assert!(PlotFile::parse("/plots/a_b_c_d", 0).is_err());
        assert!(PlotFile::parse("/plots/12345_-1_4096_128", 0).is_err());
        assert!(PlotFile::parse("", 0).is_err());
    }

    #[test]
    fn test_validate_outcomes() {
        let complete = 8 * PLOT_SIZE as u64;
        assert_matches!(PlotFile::validate("1_0_8_4", complete), PlotCheckResult::Ok);
        assert_matches!(PlotFile::validate("", 0), PlotCheckResult::EmptyParameter);
        assert_matches!(
            PlotFile::validate("1_0_8_4", complete - 1),
            PlotCheckResult::Incomplete
        );
        assert_matches!(
            PlotFile::validate("1_0_8_3", complete),
            PlotCheckResult::WrongStaggersize
        );
        assert_matches!(
            PlotFile::validate("1_0_8_0", complete),
            PlotCheckResult::InvalidParameter
        );
        assert_matches!(
            PlotFile::validate("1_0_0_4", 0),
            PlotCheckResult::InvalidParameter
        );
        assert_matches!(
            PlotFile::validate("nonsense.txt", 0),
            PlotCheckResult::InvalidParameter
        );
    }

    #[test]
    fn test_validate_rejects_wrapping_nonce_range() {
        let name = format!("1_{}_8_4", u64::MAX - 5);
        assert_matches!(
            PlotFile::validate(&name, 8 * PLOT_SIZE as u64),
            PlotCheckResult::InvalidParameter
        );
    }

    #[test]
    fn test_nonce_end_saturates_instead_of_wrapping() {
        let plot = PlotFile::parse(format!("1_{}_8_4", u64::MAX - 5), 0).unwrap();
        assert_eq!(plot.nonce_end(), u64::MAX);

        let plot = PlotFile::parse("1_100_8_4", 0).unwrap();
        assert_eq!(plot.nonce_end(), 108);
    }

    #[test]
    fn test_validate_tolerates_oversized_files() {
        // trailing junk after the declared range is not corruption
        let size = 8 * PLOT_SIZE as u64 + 512;
        assert_matches!(PlotFile::validate("1_0_8_4", size), PlotCheckResult::Ok);
    }

    proptest! {
        #[test]
        fn prop_name_round_trip(
            account in any::<u64>(),
            start in any::<u64>(),
            stagger in 1u64..1024,
            blocks in 1u64..64,
        ) {
            let nonces = stagger * blocks;
            let name = format!("{account}_{start}_{nonces}_{stagger}");
            let plot = PlotFile::parse(name.clone(), 0).unwrap();
            prop_assert_eq!(plot.to_string(), name);
            prop_assert_eq!(plot.stagger_count() * plot.stagger_size(), plot.nonces());
        }
    }
}

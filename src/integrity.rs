//! Sampling-based plot file integrity checking
//!
//! Regenerating a whole plot to verify it would take as long as plotting it
//! did. Instead a handful of nonces is sampled across the file, a handful of
//! scoops is sampled within each nonce, and the on-disk bytes are compared
//! against freshly generated data. The result is an estimated percentage of
//! intact data.
//!
//! The checker cooperates with the round driver: before touching the file
//! for each nonce it waits until no scan is running, so it never competes
//! with an active mining round for the disk.

use crate::generator::generate;
use crate::plotfile::PlotFile;
use crate::round::{CancelFlag, RoundContext};
use crate::types::{SCOOPS_PER_PLOT, SCOOP_SIZE};
use crate::{Error, Result};
use rand::Rng;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::info;

/// Configuration of one integrity run. The defaults match the classic
/// 30-nonce, 32-scoop sampling.
#[derive(Debug, Clone, Copy)]
pub struct IntegrityCheck {
    /// Number of nonces sampled across the file
    pub check_nonces: u64,
    /// Number of scoops sampled per nonce
    pub check_scoops: u64,
}

impl Default for IntegrityCheck {
    fn default() -> Self {
        Self {
            check_nonces: 30,
            check_scoops: 32,
        }
    }
}

impl IntegrityCheck {
    /// Estimate how much of `path` matches regenerated plot data.
    ///
    /// Samples one random nonce per interval, reads its sampled scoops from
    /// disk and compares them byte-for-byte against the generator's output.
    /// Returns the average intact percentage over all sampled nonces.
    /// Blocks while `round.is_processing()`; a set `cancel` flag aborts with
    /// [`Error::Cancelled`].
    pub fn run(
        &self,
        path: impl AsRef<Path>,
        round: &dyn RoundContext,
        cancel: &CancelFlag,
    ) -> Result<f64> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy();
        let size = std::fs::metadata(path)?.len();
        let plot = PlotFile::parse(&*path_str, size)?;

        let account = plot.account_id();
        let nonce_start = plot.nonce_start();
        let nonce_count = plot.nonces();
        let nonce_end = plot.nonce_end();
        let stagger_size = plot.stagger_size();
        if stagger_size == 0 || nonce_count == 0 {
            return Err(Error::integrity(format!(
                "{path_str} declares empty geometry"
            )));
        }

        info!(path = %path_str, "checking file for corruption");

        let mut rng = rand::rng();
        let nonce_step = (nonce_count / self.check_nonces).max(1);
        let scoop_step = (SCOOPS_PER_PLOT as u64 / self.check_scoops).max(1);

        let mut total_integrity = 0.0;
        let mut nonces_checked = 0u64;

        let mut nonce_interval = nonce_start;
        while nonce_interval < nonce_end {
            if !round.wait_until_idle(cancel) {
                return Err(Error::cancelled("plot integrity check"));
            }

            let nonce = nonce_interval
                .saturating_add(rng.random_range(0..nonce_step))
                .min(nonce_end - 1);

            let gendata = generate(account, nonce);

            let index = nonce - nonce_start;
            let nonce_offset =
                index / stagger_size * plot.stagger_bytes() + index % stagger_size * SCOOP_SIZE as u64;
            let scoop_stride = plot.stagger_scoop_bytes();

            let mut file = File::open(path)?;
            let mut buffer = [0u8; SCOOP_SIZE];
            let mut scoops_intact = 0u64;
            let mut scoops_checked = 0u64;

            let mut scoop_interval = 0u64;
            while scoop_interval < SCOOPS_PER_PLOT as u64 {
                let scoop = (scoop_interval + rng.random_range(0..scoop_step))
                    .min(SCOOPS_PER_PLOT as u64 - 1);

                file.seek(SeekFrom::Start(nonce_offset + scoop * scoop_stride))?;
                file.read_exact(&mut buffer)?;

                let expected = &gendata[scoop as usize * SCOOP_SIZE..(scoop as usize + 1) * SCOOP_SIZE];
                if buffer == *expected {
                    scoops_intact += 1;
                }
                scoops_checked += 1;

                scoop_interval += scoop_step;
            }

            if scoops_checked > 0 {
                let intact = scoops_intact as f64 / scoops_checked as f64 * 100.0;
                info!(nonce, intact = format_args!("{intact:.1}%"), "nonce sampled");
                total_integrity += intact;
                nonces_checked += 1;
            }

            nonce_interval = nonce_interval.saturating_add(nonce_step);
        }

        if nonces_checked == 0 {
            return Err(Error::integrity(format!("{path_str}: no nonces sampled")));
        }

        let integrity = total_integrity / nonces_checked as f64;
        info!(path = %path_str, integrity = format_args!("{integrity:.1}%"), "total integrity");
        Ok(integrity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::write_nonce;
    use crate::round::StaticRound;
    use crate::types::{GenerationSignature, HASH_SIZE, PLOT_SIZE};
    use std::io::Write;
    use tempfile::TempDir;

    fn test_round() -> StaticRound {
        StaticRound::new(GenerationSignature::new([0u8; HASH_SIZE]), 0, 1)
    }

    /// Writes a complete little plot file and returns its path.
    fn write_plot(dir: &Path, account: u64, nonce_start: u64, nonces: u64) -> std::path::PathBuf {
        let path = dir.join(format!("{account}_{nonce_start}_{nonces}_1"));
        let mut file = File::create(&path).unwrap();
        file.set_len(nonces * PLOT_SIZE as u64).unwrap();
        let plot = PlotFile::parse(path.to_string_lossy(), nonces * PLOT_SIZE as u64).unwrap();
        for nonce in nonce_start..nonce_start + nonces {
            let buffer = generate(account, nonce);
            write_nonce(&mut file, &plot, nonce, &buffer).unwrap();
        }
        path
    }

    #[test]
    fn test_pristine_file_is_fully_intact() {
        let tmp = TempDir::new().unwrap();
        let path = write_plot(tmp.path(), 1234, 0, 2);

        let check = IntegrityCheck {
            check_nonces: 2,
            check_scoops: 8,
        };
        let integrity = check.run(&path, &test_round(), &CancelFlag::new()).unwrap();
        assert_eq!(integrity, 100.0);
    }

    #[test]
    fn test_corruption_reduces_percentage() {
        let tmp = TempDir::new().unwrap();
        let path = write_plot(tmp.path(), 1234, 0, 2);

        // flip the first half of nonce 0's data; every sampled scoop in that
        // half fails regardless of which scoop the sampler picks
        let mut file = File::options().write(true).open(&path).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.write_all(&vec![0xffu8; PLOT_SIZE / 2]).unwrap();
        drop(file);

        let check = IntegrityCheck {
            check_nonces: 2,
            check_scoops: 8,
        };
        let integrity = check.run(&path, &test_round(), &CancelFlag::new()).unwrap();
        assert!(integrity > 0.0 && integrity < 100.0);
    }

    #[test]
    fn test_cancelled_while_round_is_busy() {
        let tmp = TempDir::new().unwrap();
        let path = write_plot(tmp.path(), 1, 0, 1);

        let round = test_round();
        round.gate().set_processing(true);
        let cancel = CancelFlag::new();
        cancel.cancel();

        let result = IntegrityCheck::default().run(&path, &round, &cancel);
        assert!(matches!(result, Err(Error::Cancelled { .. })));
    }

    #[test]
    fn test_unparsable_path_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("not-a-plot");
        File::create(&path).unwrap();

        let result = IntegrityCheck::default().run(&path, &test_round(), &CancelFlag::new());
        assert!(matches!(result, Err(Error::PlotFile { .. })));
    }
}

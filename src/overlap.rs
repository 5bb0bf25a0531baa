//! Nonce-overlap detection
//!
//! Two plot files of the same account must never cover the same nonce;
//! overlapping ranges waste capacity and hand in duplicate deadlines. The
//! scan is a plain n-squared cross product, fine for the tens of files an
//! account realistically has.

use crate::plotfile::PlotFile;
use std::sync::Arc;
use tracing::error;

/// Report every nonce-range collision between plot files of one account.
///
/// A pair is reported when one file's start nonce falls inside the other's
/// range; the orientation whose start lies inside decides which file counts
/// as "second". Each collision is logged with both paths and the overlap
/// length in nonces. Returns the total number of reported collisions.
pub fn check_plot_overlaps(plotfiles: &[Arc<PlotFile>]) -> u64 {
    let mut total_overlaps = 0;

    for lhs in plotfiles {
        for rhs in plotfiles {
            if Arc::ptr_eq(lhs, rhs) || lhs.account_id() != rhs.account_id() {
                continue;
            }

            // orient the pair so that `second` starts inside `first`
            let oriented = if rhs.nonce_start() >= lhs.nonce_start()
                && rhs.nonce_start() < lhs.nonce_end()
            {
                Some((lhs, rhs))
            } else if lhs.nonce_start() >= rhs.nonce_start()
                && lhs.nonce_start() < rhs.nonce_end()
            {
                Some((rhs, lhs))
            } else {
                None
            };

            if let Some((first, second)) = oriented {
                let overlap =
                    (first.nonce_end() - second.nonce_start()).min(second.nonces());
                error!(
                    first = first.path(),
                    second = second.path(),
                    overlap,
                    "plot files overlap"
                );
                total_overlaps += 1;
            }
        }
    }

    total_overlaps
}

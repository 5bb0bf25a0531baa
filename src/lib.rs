//! Proof-of-capacity plot core
//!
//! The storage and compute heart of a PoC mining client:
//! - Plot file identity and geometry parsed from the canonical file name
//! - Plot directory trees with rescans and change-detection fingerprints
//! - Nonce-overlap detection across plot files of one account
//! - The cascading-hash nonce generator and the round deadline check
//! - Sampling-based integrity scanning of existing plot files
//!
//! Network communication, GPU hashing and the parallel scan scheduler are
//! external collaborators; this crate only consumes the mining round through
//! the [`RoundContext`] trait.

pub mod config;
pub mod error;
pub mod generator;
pub mod integrity;
pub mod overlap;
pub mod plotdir;
pub mod plotfile;
pub mod round;
pub mod types;

pub use config::load_plot_dirs;
pub use error::{Error, Result};
pub use generator::{calculate_deadline, generate, generate_and_check, write_nonce};
pub use integrity::IntegrityCheck;
pub use overlap::check_plot_overlaps;
pub use plotdir::{DirKind, PlotDir};
pub use plotfile::{PlotCheckResult, PlotFile};
pub use round::{CancelFlag, ProcessingGate, RoundContext, StaticRound};
pub use types::*;

/// Application information
pub const APP_NAME: &str = "poc-plot-core";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

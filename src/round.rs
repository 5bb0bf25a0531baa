//! Round context boundary
//!
//! The mining round driver lives outside this crate; the core consumes it
//! read-only through [`RoundContext`]. The integrity checker additionally
//! needs to wait for the driver to go idle before touching a plot file, so
//! the trait carries a blocking `wait_until_idle` with a polling default.
//! Drivers that own a [`ProcessingGate`] get a proper condition-variable wait
//! instead of wake-up polling.

use crate::types::GenerationSignature;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared cancellation flag for blocking waits.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, uncancelled flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; wakes nothing by itself, waiters observe the
    /// flag on their next wake-up
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Read-only view of the current mining round.
pub trait RoundContext {
    /// Current generation signature
    fn generation_signature(&self) -> GenerationSignature;

    /// Current scoop number, in `[0, SCOOPS_PER_PLOT)`
    fn scoop_number(&self) -> u64;

    /// Current base target, non-zero
    fn base_target(&self) -> u64;

    /// Whether a plot scan is currently running
    fn is_processing(&self) -> bool;

    /// Block until the round driver is idle or `cancel` is set.
    ///
    /// Returns `false` when the wait was cancelled. The default is a
    /// one-second poll of `is_processing`; implementors backed by a
    /// [`ProcessingGate`] should delegate to [`ProcessingGate::wait_until_idle`].
    fn wait_until_idle(&self, cancel: &CancelFlag) -> bool {
        while self.is_processing() {
            if cancel.is_cancelled() {
                return false;
            }
            std::thread::sleep(Duration::from_secs(1));
        }
        !cancel.is_cancelled()
    }
}

/// Condition-variable gate around the driver's busy flag.
///
/// The driver flips the flag around each scan; waiters block on the condvar
/// instead of sleeping blind. Waits still wake periodically to observe
/// cancellation, since a cancel carries no notification of its own.
#[derive(Debug, Default)]
pub struct ProcessingGate {
    processing: Mutex<bool>,
    idle: Condvar,
}

impl ProcessingGate {
    /// Create a new gate in the idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the busy flag; waking all idle-waiters when clearing it
    pub fn set_processing(&self, processing: bool) {
        let mut guard = self.processing.lock();
        *guard = processing;
        if !processing {
            self.idle.notify_all();
        }
    }

    /// Whether the driver currently reports busy
    pub fn is_processing(&self) -> bool {
        *self.processing.lock()
    }

    /// Block until idle or cancelled; returns `false` on cancellation
    pub fn wait_until_idle(&self, cancel: &CancelFlag) -> bool {
        let mut guard = self.processing.lock();
        while *guard {
            if cancel.is_cancelled() {
                return false;
            }
            self.idle.wait_for(&mut guard, Duration::from_millis(250));
        }
        !cancel.is_cancelled()
    }
}

/// Owned round context over a [`ProcessingGate`].
///
/// Used by offline tools and tests; a real miner typically implements
/// [`RoundContext`] on its own round state instead.
#[derive(Debug)]
pub struct StaticRound {
    generation_signature: GenerationSignature,
    scoop_number: u64,
    base_target: u64,
    gate: Arc<ProcessingGate>,
}

impl StaticRound {
    /// Create a round context with fixed parameters and an idle gate
    pub fn new(generation_signature: GenerationSignature, scoop_number: u64, base_target: u64) -> Self {
        Self {
            generation_signature,
            scoop_number,
            base_target,
            gate: Arc::new(ProcessingGate::new()),
        }
    }

    /// The gate driving `is_processing`
    pub fn gate(&self) -> Arc<ProcessingGate> {
        Arc::clone(&self.gate)
    }
}

impl RoundContext for StaticRound {
    fn generation_signature(&self) -> GenerationSignature {
        self.generation_signature
    }

    fn scoop_number(&self) -> u64 {
        self.scoop_number
    }

    fn base_target(&self) -> u64 {
        self.base_target
    }

    fn is_processing(&self) -> bool {
        self.gate.is_processing()
    }

    fn wait_until_idle(&self, cancel: &CancelFlag) -> bool {
        self.gate.wait_until_idle(cancel)
    }
}

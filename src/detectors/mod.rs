//! The three pattern detectors. Each is best-effort: an internal panic or
//! a cooperative-cancellation check is handled by the caller (`engine`),
//! not here — a detector function itself always returns a plain
//! `Vec<Ring>`, never a `Result`, per §4.3/4.4/4.5's failure semantics
//! ("any internal exception yields an empty ring list").

pub mod cycles;
pub mod shells;
pub mod smurfing;

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cooperative-cancellation flag, checked at outer-loop granularity
/// inside each detector (start-node / hub-candidate / source-iteration),
/// per §5.
#[derive(Default)]
pub struct CancellationFlag(AtomicBool);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

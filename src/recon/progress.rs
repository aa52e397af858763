//! Progress shared between a running reconstruction and its observers.
//!
//! All fields are atomics so a UI or scheduler thread can poll the state or
//! request cancellation through an `Arc<Progress>` while the owning worker
//! keeps writing. Cancellation is cooperative: the growth loop checks the
//! flag between pops.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    Seeding,
    SelectingViews,
    Growing,
    Stalled,
    Refilling,
    Done,
    Cancelled,
}

impl Status {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Status::Seeding,
            2 => Status::SelectingViews,
            3 => Status::Growing,
            4 => Status::Stalled,
            5 => Status::Refilling,
            6 => Status::Done,
            7 => Status::Cancelled,
            _ => Status::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Status::Idle => 0,
            Status::Seeding => 1,
            Status::SelectingViews => 2,
            Status::Growing => 3,
            Status::Stalled => 4,
            Status::Refilling => 5,
            Status::Done => 6,
            Status::Cancelled => 7,
        }
    }

    /// `Done` or `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Done | Status::Cancelled)
    }
}

#[derive(Debug)]
pub struct Progress {
    status: AtomicU8,
    queue_size: AtomicUsize,
    filled: AtomicUsize,
    total: AtomicUsize,
    cancelled: AtomicBool,
    started: Instant,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self {
            status: AtomicU8::new(Status::Idle.as_u8()),
            queue_size: AtomicUsize::new(0),
            filled: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            started: Instant::now(),
        }
    }

    pub fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn set_status(&self, status: Status) {
        self.status.store(status.as_u8(), Ordering::Release);
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size.load(Ordering::Relaxed)
    }

    pub(crate) fn set_queue_size(&self, size: usize) {
        self.queue_size.store(size, Ordering::Relaxed);
    }

    /// Pixels of the reference view holding an estimate.
    pub fn filled(&self) -> usize {
        self.filled.load(Ordering::Relaxed)
    }

    pub(crate) fn set_filled(&self, filled: usize) {
        self.filled.store(filled, Ordering::Relaxed);
    }

    pub(crate) fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Share of filled pixels in percent; 0 before the image size is known.
    pub fn percent_complete(&self) -> f32 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        100.0 * self.filled() as f32 / total as f32
    }

    /// Asks the reconstruction to stop at its next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

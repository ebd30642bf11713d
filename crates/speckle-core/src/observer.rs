// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Observers
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-iteration observers and cancellation checks.
//!
//! Observers see each completed iteration and cannot alter the run.
//! Cancellation is polled before every iteration.

use ndarray::Array2;
use speckle_types::state::IterationDiagnostics;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Read-only view of the ADMM state after one iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationSnapshot<'a> {
    pub iteration: usize,
    pub reflectance: &'a Array2<f64>,
    pub denoised: &'a Array2<f64>,
    pub dual: &'a Array2<f64>,
    pub diagnostics: &'a IterationDiagnostics,
}

pub trait IterationObserver {
    fn on_iteration(&mut self, snapshot: &IterationSnapshot<'_>);
}

impl<F> IterationObserver for F
where
    F: FnMut(&IterationSnapshot<'_>),
{
    fn on_iteration(&mut self, snapshot: &IterationSnapshot<'_>) {
        self(snapshot)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl IterationObserver for NoopObserver {
    fn on_iteration(&mut self, _snapshot: &IterationSnapshot<'_>) {}
}

pub trait Cancellation {
    /// Checked before `next_iteration` (1-based) starts.
    fn should_cancel(&self, next_iteration: usize) -> bool;
}

impl<F> Cancellation for F
where
    F: Fn(usize) -> bool,
{
    fn should_cancel(&self, next_iteration: usize) -> bool {
        self(next_iteration)
    }
}

impl Cancellation for AtomicBool {
    fn should_cancel(&self, _next_iteration: usize) -> bool {
        self.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn should_cancel(&self, _next_iteration: usize) -> bool {
        false
    }
}

/// Wall-clock limit.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    until: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Deadline {
            until: Instant::now() + timeout,
        }
    }
}

impl Cancellation for Deadline {
    fn should_cancel(&self, _next_iteration: usize) -> bool {
        Instant::now() >= self.until
    }
}

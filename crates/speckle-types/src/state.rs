// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array2;

/// Lifecycle of one ADMM reconstruction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Initialized,
    /// `iteration` update cycles have completed (1-based).
    Iterating { iteration: usize },
    Terminated,
}

impl RunPhase {
    /// Number of completed update cycles.
    pub fn completed(self, max_iters: usize) -> usize {
        match self {
            RunPhase::Initialized => 0,
            RunPhase::Iterating { iteration } => iteration,
            RunPhase::Terminated => max_iters,
        }
    }
}

/// Per-iteration convergence diagnostics. Monitoring only.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationDiagnostics {
    pub iteration: usize,
    /// Objective value after the inversion step.
    pub cost: f64,
    /// PSNR of `r` against the configured ground truth [dB].
    pub psnr: Option<f64>,
    /// ‖r - v‖ after the dual update.
    pub residual_norm: f64,
    /// ‖v_prev - v‖.
    pub step_norm: f64,
    /// Largest imaginary magnitude among the selected cubic roots.
    pub max_root_imag: f64,
    /// Pixels whose selected root exceeded the imaginary tolerance.
    pub flagged_pixels: usize,
}

/// One recorded `(r_k, v_k)` pair.
#[derive(Debug, Clone)]
pub struct IterateRecord {
    pub reflectance: Array2<f64>,
    pub denoised: Array2<f64>,
}

/// Output of a reconstruction run.
#[derive(Debug, Clone)]
pub struct ReconstructionResult {
    /// Final reflectance estimate `r`.
    pub reflectance: Array2<f64>,
    /// Final denoised estimate `v` (equals `r` in ML mode).
    pub denoised: Array2<f64>,
    /// Final scaled dual `u` (zero in ML mode).
    pub dual: Array2<f64>,
    pub iterations: usize,
    pub diagnostics: Vec<IterationDiagnostics>,
    /// Populated when trace recording is enabled.
    pub trace: Option<Vec<IterateRecord>>,
}

impl ReconstructionResult {
    /// Row-major flattening of the reflectance.
    pub fn flattened(&self) -> Vec<f64> {
        self.reflectance.iter().copied().collect()
    }

    pub fn final_psnr(&self) -> Option<f64> {
        self.diagnostics.last().and_then(|d| d.psnr)
    }

    pub fn cost_history(&self) -> Vec<f64> {
        self.diagnostics.iter().map(|d| d.cost).collect()
    }

    pub fn residual_history(&self) -> Vec<f64> {
        self.diagnostics.iter().map(|d| d.residual_norm).collect()
    }
}

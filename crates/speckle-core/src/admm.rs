// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — ADMM Reconstructor
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Plug-and-Play ADMM reconstruction of reflectance from speckle.
//!
//! Splitting with scaled dual `u`:
//! ```text
//! r̃ = v - u ;  r = Inv(r̃) ;  ṽ = r + u ;  v = D(ṽ) ;  u += r - v
//! ```
//! The loop runs exactly `max_iters` cycles; diagnostics are recorded but
//! never gate termination.

use crate::cost::CostEvaluator;
use crate::denoise::{denoiser_for, Denoiser};
use crate::inversion::{ml_estimate, InversionOperator};
use crate::observer::{Cancellation, IterationObserver, IterationSnapshot, NeverCancel, NoopObserver};
use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;
use speckle_math::fft::{ifft2, FftNorm};
use speckle_math::metrics::diff_norm;
use speckle_types::config::{InversionModel, ReconstructorConfig};
use speckle_types::error::{SpeckleError, SpeckleResult};
use speckle_types::state::{
    IterateRecord, IterationDiagnostics, ReconstructionResult, RunPhase,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Reconstructor bound to one validated configuration and one denoiser.
///
/// Cheap to clone; clones share the configuration and denoiser.
#[derive(Clone)]
pub struct Reconstructor {
    config: Arc<ReconstructorConfig>,
    denoiser: Arc<dyn Denoiser>,
}

impl fmt::Debug for Reconstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconstructor")
            .field("config", &self.config)
            .field("denoiser", &self.denoiser.label())
            .finish()
    }
}

impl Reconstructor {
    /// Uses the built-in denoiser selected by the configuration.
    pub fn new(config: ReconstructorConfig) -> Self {
        let denoiser = denoiser_for(&config);
        Reconstructor {
            config: Arc::new(config),
            denoiser,
        }
    }

    /// Replace the denoiser with any [`Denoiser`], closures included.
    pub fn with_denoiser<D: Denoiser + 'static>(mut self, denoiser: D) -> Self {
        self.denoiser = Arc::new(denoiser);
        self
    }

    pub fn config(&self) -> &ReconstructorConfig {
        &self.config
    }

    pub fn denoiser_label(&self) -> &str {
        self.denoiser.label()
    }

    fn check_input(&self, y: &Array2<Complex64>) -> SpeckleResult<()> {
        let expected = self.config.object_size().shape();
        if y.dim() != expected {
            return Err(SpeckleError::ShapeMismatch {
                context: "measurement",
                expected,
                actual: y.len(),
            });
        }
        if y.iter().any(|c| !c.re.is_finite() || !c.im.is_finite()) {
            return Err(SpeckleError::Numerical {
                iteration: 0,
                message: "measurement contains non-finite values".to_string(),
            });
        }
        Ok(())
    }

    /// `x = IFFT(y)` with unitary normalization.
    pub fn back_project(&self, y: &Array2<Complex64>) -> SpeckleResult<Array2<Complex64>> {
        self.check_input(y)?;
        Ok(ifft2(y, FftNorm::Ortho))
    }

    fn intensity(&self, y: &Array2<Complex64>) -> SpeckleResult<Array2<f64>> {
        Ok(self.back_project(y)?.mapv(|x| x.norm_sqr()))
    }

    /// Begin a stepwise PnP run. Fails for the closed-form ML model.
    pub fn start(&self, y: &Array2<Complex64>) -> SpeckleResult<AdmmRun<'_>> {
        if self.config.inversion_model() != InversionModel::PlugAndPlay {
            return Err(SpeckleError::config(
                "inversion_model",
                format!(
                    "stepwise runs require PnP, got {}",
                    self.config.inversion_model()
                ),
            ));
        }
        let intensity = self.intensity(y)?;
        let (rows, cols) = intensity.dim();
        info!(
            rows,
            cols,
            max_iters = self.config.max_iters(),
            denoiser = self.denoiser.label(),
            "starting PnP ADMM reconstruction"
        );
        Ok(AdmmRun::new(self, intensity))
    }

    pub fn reconstruct(&self, y: &Array2<Complex64>) -> SpeckleResult<ReconstructionResult> {
        self.reconstruct_with(y, &mut NoopObserver, &NeverCancel)
    }

    /// Run to completion, reporting each iteration to `observer` and polling
    /// `cancel` before each iteration starts.
    pub fn reconstruct_with(
        &self,
        y: &Array2<Complex64>,
        observer: &mut dyn IterationObserver,
        cancel: &dyn Cancellation,
    ) -> SpeckleResult<ReconstructionResult> {
        if self.config.inversion_model() == InversionModel::MaximumLikelihood {
            if cancel.should_cancel(1) {
                info!(iteration = 1, "reconstruction cancelled");
                return Err(SpeckleError::Cancelled { iteration: 1 });
            }
            let result = self.reconstruct_ml(y)?;
            if let Some(diagnostics) = result.diagnostics.last() {
                observer.on_iteration(&IterationSnapshot {
                    iteration: diagnostics.iteration,
                    reflectance: &result.reflectance,
                    denoised: &result.denoised,
                    dual: &result.dual,
                    diagnostics,
                });
            }
            return Ok(result);
        }

        let mut run = self.start(y)?;
        loop {
            let next = run.completed() + 1;
            if next <= self.config.max_iters() && cancel.should_cancel(next) {
                info!(iteration = next, "reconstruction cancelled");
                return Err(SpeckleError::Cancelled { iteration: next });
            }
            if run.step()?.is_none() {
                break;
            }
            if let Some(snapshot) = run.snapshot() {
                observer.on_iteration(&snapshot);
            }
        }
        Ok(run.finish())
    }

    /// Independent reconstructions in parallel, results in input order.
    pub fn reconstruct_batch(
        &self,
        measurements: &[Array2<Complex64>],
    ) -> Vec<SpeckleResult<ReconstructionResult>> {
        measurements.par_iter().map(|y| self.reconstruct(y)).collect()
    }

    /// Closed-form ML: the input is taken as the field `x` itself and
    /// `r = |x|² - σw²` is applied pixel by pixel.
    fn reconstruct_ml(&self, x: &Array2<Complex64>) -> SpeckleResult<ReconstructionResult> {
        self.check_input(x)?;
        let r = ml_estimate(x, self.config.sigma_w());
        let intensity = x.mapv(|x| x.norm_sqr());
        let cost = CostEvaluator::from_config(&self.config);
        let diagnostics = IterationDiagnostics {
            iteration: 1,
            cost: cost.evaluate(&intensity, &r, &r)?,
            psnr: self
                .config
                .ground_truth()
                .and_then(|gt| cost.psnr(&r, gt)),
            residual_norm: 0.0,
            step_norm: 0.0,
            max_root_imag: 0.0,
            flagged_pixels: 0,
        };
        info!(cost = diagnostics.cost, "ML reconstruction finished");
        Ok(ReconstructionResult {
            denoised: r.clone(),
            dual: Array2::zeros(r.dim()),
            trace: self.config.record_trace().then(|| {
                vec![IterateRecord {
                    reflectance: r.clone(),
                    denoised: r.clone(),
                }]
            }),
            reflectance: r,
            iterations: 1,
            diagnostics: vec![diagnostics],
        })
    }
}

/// In-progress PnP ADMM run.
///
/// Warm start: `v = |x|²`, `u = 0`, `r = v`.
#[derive(Debug)]
pub struct AdmmRun<'a> {
    reconstructor: &'a Reconstructor,
    inversion: InversionOperator,
    cost: CostEvaluator,
    intensity: Array2<f64>,
    r: Array2<f64>,
    v: Array2<f64>,
    u: Array2<f64>,
    phase: RunPhase,
    diagnostics: Vec<IterationDiagnostics>,
    trace: Option<Vec<IterateRecord>>,
}

impl<'a> AdmmRun<'a> {
    fn new(reconstructor: &'a Reconstructor, intensity: Array2<f64>) -> Self {
        let config = &reconstructor.config;
        let dim = intensity.dim();
        AdmmRun {
            reconstructor,
            inversion: InversionOperator::from_config(config),
            cost: CostEvaluator::from_config(config),
            r: intensity.clone(),
            v: intensity.clone(),
            u: Array2::zeros(dim),
            intensity,
            phase: RunPhase::Initialized,
            diagnostics: Vec::with_capacity(config.max_iters()),
            trace: config.record_trace().then(Vec::new),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Completed update cycles.
    pub fn completed(&self) -> usize {
        self.phase.completed(self.reconstructor.config.max_iters())
    }

    pub fn reflectance(&self) -> &Array2<f64> {
        &self.r
    }

    pub fn denoised(&self) -> &Array2<f64> {
        &self.v
    }

    pub fn dual(&self) -> &Array2<f64> {
        &self.u
    }

    /// Back-projected intensity `|x|²`.
    pub fn intensity(&self) -> &Array2<f64> {
        &self.intensity
    }

    pub fn diagnostics(&self) -> &[IterationDiagnostics] {
        &self.diagnostics
    }

    /// View of the state after the latest iteration; `None` before the first.
    pub fn snapshot(&self) -> Option<IterationSnapshot<'_>> {
        self.diagnostics.last().map(|diagnostics| IterationSnapshot {
            iteration: diagnostics.iteration,
            reflectance: &self.r,
            denoised: &self.v,
            dual: &self.u,
            diagnostics,
        })
    }

    /// Perform one update cycle. Returns `Ok(None)` once `max_iters` cycles
    /// have run, moving the run to [`RunPhase::Terminated`].
    pub fn step(&mut self) -> SpeckleResult<Option<&IterationDiagnostics>> {
        let reconstructor = self.reconstructor;
        let config = &reconstructor.config;
        if self.phase == RunPhase::Terminated || self.completed() >= config.max_iters() {
            self.phase = RunPhase::Terminated;
            return Ok(None);
        }
        let iteration = self.completed() + 1;

        let rtilde = &self.v - &self.u;
        let inverted = self.inversion.apply(&rtilde, &self.intensity)?;
        let non_finite = inverted.reflectance.iter().filter(|r| !r.is_finite()).count();
        if non_finite > 0 {
            return Err(SpeckleError::Numerical {
                iteration,
                message: format!("inversion left {non_finite} pixels without a real root"),
            });
        }
        self.r = inverted.reflectance;

        let cost = self.cost.evaluate(&self.intensity, &self.r, &rtilde)?;
        let psnr = config
            .ground_truth()
            .and_then(|gt| self.cost.psnr(&self.r, gt));

        let vtilde = &self.r + &self.u;
        let v = reconstructor
            .denoiser
            .denoise(&vtilde, config.sigma_n(), config.real_only());
        if v.dim() != vtilde.dim() {
            return Err(SpeckleError::ShapeMismatch {
                context: "denoiser output",
                expected: vtilde.dim(),
                actual: v.len(),
            });
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Err(SpeckleError::Numerical {
                iteration,
                message: format!(
                    "denoiser '{}' produced non-finite values",
                    reconstructor.denoiser.label()
                ),
            });
        }
        let v_prev = std::mem::replace(&mut self.v, v);

        self.u.zip_mut_with(&(&self.r - &self.v), |u, &d| *u += d);

        let residual_norm = diff_norm(&self.r, &self.v);
        let step_norm = diff_norm(&v_prev, &self.v);
        debug!(
            iteration,
            cost, residual_norm, step_norm, flagged = inverted.flagged, "ADMM iteration"
        );

        if let Some(trace) = self.trace.as_mut() {
            trace.push(IterateRecord {
                reflectance: self.r.clone(),
                denoised: self.v.clone(),
            });
        }
        self.diagnostics.push(IterationDiagnostics {
            iteration,
            cost,
            psnr,
            residual_norm,
            step_norm,
            max_root_imag: inverted.max_imag,
            flagged_pixels: inverted.flagged,
        });
        self.phase = RunPhase::Iterating { iteration };
        Ok(self.diagnostics.last())
    }

    /// Consume the run. Iterations not yet performed are skipped.
    pub fn finish(self) -> ReconstructionResult {
        let iterations = self.completed();
        info!(
            iterations,
            final_residual = self.diagnostics.last().map(|d| d.residual_norm),
            "PnP ADMM reconstruction finished"
        );
        ReconstructionResult {
            reflectance: self.r,
            denoised: self.v,
            dual: self.u,
            iterations,
            diagnostics: self.diagnostics,
            trace: self.trace,
        }
    }
}

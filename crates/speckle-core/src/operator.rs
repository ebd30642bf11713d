// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Operator Interface
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear-operator style entry point.
//!
//! Callers that treat reconstruction as an operator on flattened vectors
//! (iterative solvers, chained pipelines) expect `apply` plus the adjoint
//! family. Reconstruction is not linear; the adjoint family returns an
//! equivalent operator.

use crate::admm::Reconstructor;
use ndarray::Array2;
use num_complex::Complex64;
use speckle_types::error::{SpeckleError, SpeckleResult};

pub trait ReconstructionOperator: Sized {
    /// Reshape the row-major `input` to the object size, reconstruct and
    /// return the flattened reflectance.
    fn apply(&self, input: &[Complex64]) -> SpeckleResult<Vec<f64>>;

    fn conjugate(&self) -> Self;

    fn transpose(&self) -> Self;

    /// Conjugate transpose.
    fn adjoint(&self) -> Self {
        self.conjugate().transpose()
    }
}

impl ReconstructionOperator for Reconstructor {
    fn apply(&self, input: &[Complex64]) -> SpeckleResult<Vec<f64>> {
        let expected = self.config().object_size().shape();
        let y = Array2::from_shape_vec(expected, input.to_vec()).map_err(|_| {
            SpeckleError::ShapeMismatch {
                context: "operator input",
                expected,
                actual: input.len(),
            }
        })?;
        Ok(self.reconstruct(&y)?.flattened())
    }

    fn conjugate(&self) -> Self {
        self.clone()
    }

    fn transpose(&self) -> Self {
        self.clone()
    }
}

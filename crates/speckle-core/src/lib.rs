// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Reconstruction Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Plug-and-Play ADMM reflectance reconstruction.
//!
//! Inversion operator, pluggable denoisers, cost evaluation and the ADMM
//! reconstructor with its observer and cancellation hooks.

pub mod admm;
pub mod cost;
pub mod denoise;
pub mod inversion;
pub mod observer;
pub mod operator;

pub use admm::{AdmmRun, Reconstructor};
pub use denoise::Denoiser;
pub use operator::ReconstructionOperator;

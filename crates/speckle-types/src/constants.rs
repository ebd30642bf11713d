// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Default ADMM iteration count.
pub const DEFAULT_MAX_ITERS: usize = 25;

/// Default inversion regularization strength (sigma_lambda).
pub const DEFAULT_SIGMA_LAMBDA: f64 = 0.1;

/// Default denoiser strength (sigma_n).
pub const DEFAULT_SIGMA_N: f64 = 0.1;

/// Default number of Chambolle dual iterations per TV denoise call.
pub const DEFAULT_TV_ITERATIONS: usize = 50;

/// Imaginary magnitude above which a selected cubic root is reported.
pub const ROOT_IMAG_TOLERANCE: f64 = 1e-6;

/// Roots within this distance of the minimal imaginary magnitude are ties.
pub const ROOT_TIE_TOLERANCE: f64 = 1e-8;

/// Floor for the per-pixel variance r + sigma_w^2 in the cost evaluation.
pub const VARIANCE_FLOOR: f64 = 1e-12;

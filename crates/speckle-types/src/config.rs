// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{
    DEFAULT_MAX_ITERS, DEFAULT_SIGMA_LAMBDA, DEFAULT_SIGMA_N, DEFAULT_TV_ITERATIONS,
};
use crate::error::{SpeckleError, SpeckleResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Declares a closed set of named options parsed case-insensitively from text.
/// Unknown names fail with a `Config` error listing the supported set.
macro_rules! named_options {
    (
        $(#[$meta:meta])*
        pub enum $name:ident in $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Supported names formatted as `{A, B}`.
            pub fn supported() -> String {
                format!("{{{}}}", [$($label),+].join(", "))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = SpeckleError;

            fn from_str(s: &str) -> SpeckleResult<Self> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        SpeckleError::config(
                            $field,
                            format!("unsupported value '{wanted}'; supported: {}", Self::supported()),
                        )
                    })
            }
        }
    };
}

named_options! {
    /// Reflectance estimator: closed-form ML or iterative plug-and-play ADMM.
    pub enum InversionModel in "inversion_model" {
        #[default]
        MaximumLikelihood => "ML",
        PlugAndPlay => "PnP",
    }
}

named_options! {
    /// Measurement noise statistics.
    pub enum NoiseModel in "noise_model" {
        #[default]
        Gaussian => "Gaussian",
        Poisson => "Poisson",
    }
}

named_options! {
    /// Denoiser family plugged into the ADMM prior step.
    pub enum DenoiserKind in "denoiser" {
        #[default]
        TotalVariation => "TV",
        LowPass => "LowPass",
    }
}

named_options! {
    /// Data term of the per-pixel inversion objective.
    ///
    /// `LogVariance` keeps only `ln(r + sigma_w^2)` and reproduces the reference
    /// cubic coefficients. `Full` adds `|x|^2 / (r + sigma_w^2)`, coupling the
    /// inversion to the back-projected intensity.
    pub enum LikelihoodTerm in "likelihood" {
        #[default]
        LogVariance => "log-variance",
        Full => "full",
    }
}

/// Object size in pixels, `rows x cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectSize {
    pub rows: usize,
    pub cols: usize,
}

impl ObjectSize {
    pub fn new(rows: usize, cols: usize) -> SpeckleResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(SpeckleError::config(
                "object_size",
                format!("dimensions must be positive, got [{rows}, {cols}]"),
            ));
        }
        Ok(ObjectSize { rows, cols })
    }

    /// Accepts any two-element size vector.
    pub fn from_slice(dims: &[usize]) -> SpeckleResult<Self> {
        match *dims {
            [rows, cols] => Self::new(rows, cols),
            _ => Err(SpeckleError::config(
                "object_size",
                format!("expected exactly 2 dimensions, got {dims:?}"),
            )),
        }
    }

    pub fn shape(self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn pixel_count(self) -> usize {
        self.rows * self.cols
    }
}

fn validate_positive(field: &'static str, value: f64) -> SpeckleResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SpeckleError::config(
            field,
            format!("must be finite and > 0, got {value}"),
        ));
    }
    Ok(value)
}

/// Validated, immutable reconstruction settings.
#[derive(Debug, Clone)]
pub struct ReconstructorConfig {
    object_size: ObjectSize,
    inversion_model: InversionModel,
    noise_model: NoiseModel,
    sigma_w: f64,
    max_iters: usize,
    sigma_lambda: f64,
    sigma_n: f64,
    denoiser: DenoiserKind,
    likelihood: LikelihoodTerm,
    ground_truth: Option<Array2<f64>>,
    real_only: bool,
    record_trace: bool,
    tv_iterations: usize,
}

impl ReconstructorConfig {
    /// Start a builder with the two required settings.
    pub fn builder(object_size: impl AsRef<[usize]>, sigma_w: impl Into<f64>) -> ConfigBuilder {
        ConfigBuilder {
            object_size: object_size.as_ref().to_vec(),
            sigma_w: sigma_w.into(),
            inversion_model: InversionModel::default(),
            noise_model: NoiseModel::default(),
            max_iters: DEFAULT_MAX_ITERS,
            sigma_lambda: DEFAULT_SIGMA_LAMBDA,
            sigma_n: DEFAULT_SIGMA_N,
            denoiser: DenoiserKind::default(),
            likelihood: LikelihoodTerm::default(),
            ground_truth: None,
            real_only: true,
            record_trace: false,
            tv_iterations: DEFAULT_TV_ITERATIONS,
        }
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> SpeckleResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> SpeckleResult<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;
        file.into_config()
    }

    /// Serialize to pretty JSON. Ground truth is not part of the file form.
    pub fn to_json_string(&self) -> SpeckleResult<String> {
        Ok(serde_json::to_string_pretty(&ConfigFile::from(self))?)
    }

    pub fn object_size(&self) -> ObjectSize {
        self.object_size
    }
    pub fn inversion_model(&self) -> InversionModel {
        self.inversion_model
    }
    pub fn noise_model(&self) -> NoiseModel {
        self.noise_model
    }
    pub fn sigma_w(&self) -> f64 {
        self.sigma_w
    }
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }
    pub fn sigma_lambda(&self) -> f64 {
        self.sigma_lambda
    }
    pub fn sigma_n(&self) -> f64 {
        self.sigma_n
    }
    pub fn denoiser(&self) -> DenoiserKind {
        self.denoiser
    }
    pub fn likelihood(&self) -> LikelihoodTerm {
        self.likelihood
    }
    pub fn ground_truth(&self) -> Option<&Array2<f64>> {
        self.ground_truth.as_ref()
    }
    pub fn real_only(&self) -> bool {
        self.real_only
    }
    pub fn record_trace(&self) -> bool {
        self.record_trace
    }
    pub fn tv_iterations(&self) -> usize {
        self.tv_iterations
    }
}

/// Builder for [`ReconstructorConfig`]. Nothing is validated until `build`.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    object_size: Vec<usize>,
    sigma_w: f64,
    inversion_model: InversionModel,
    noise_model: NoiseModel,
    max_iters: usize,
    sigma_lambda: f64,
    sigma_n: f64,
    denoiser: DenoiserKind,
    likelihood: LikelihoodTerm,
    ground_truth: Option<Array2<f64>>,
    real_only: bool,
    record_trace: bool,
    tv_iterations: usize,
}

impl ConfigBuilder {
    pub fn inversion_model(mut self, model: InversionModel) -> Self {
        self.inversion_model = model;
        self
    }

    pub fn noise_model(mut self, noise: NoiseModel) -> Self {
        self.noise_model = noise;
        self
    }

    pub fn max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn sigma_lambda(mut self, sigma_lambda: impl Into<f64>) -> Self {
        self.sigma_lambda = sigma_lambda.into();
        self
    }

    pub fn sigma_n(mut self, sigma_n: impl Into<f64>) -> Self {
        self.sigma_n = sigma_n.into();
        self
    }

    pub fn denoiser(mut self, denoiser: DenoiserKind) -> Self {
        self.denoiser = denoiser;
        self
    }

    pub fn likelihood(mut self, likelihood: LikelihoodTerm) -> Self {
        self.likelihood = likelihood;
        self
    }

    /// Reference reflectance used only for PSNR diagnostics.
    pub fn ground_truth(mut self, ground_truth: Array2<f64>) -> Self {
        self.ground_truth = Some(ground_truth);
        self
    }

    pub fn real_only(mut self, real_only: bool) -> Self {
        self.real_only = real_only;
        self
    }

    /// Keep every `(r_k, v_k)` pair in the result.
    pub fn record_trace(mut self, record_trace: bool) -> Self {
        self.record_trace = record_trace;
        self
    }

    pub fn tv_iterations(mut self, tv_iterations: usize) -> Self {
        self.tv_iterations = tv_iterations;
        self
    }

    pub fn build(self) -> SpeckleResult<ReconstructorConfig> {
        let object_size = ObjectSize::from_slice(&self.object_size)?;
        let sigma_w = validate_positive("sigma_w", self.sigma_w)?;
        let sigma_lambda = validate_positive("sigma_lambda", self.sigma_lambda)?;
        let sigma_n = validate_positive("sigma_n", self.sigma_n)?;
        if self.max_iters == 0 {
            return Err(SpeckleError::config("max_iters", "must be >= 1"));
        }
        if self.tv_iterations == 0 {
            return Err(SpeckleError::config("tv_iterations", "must be >= 1"));
        }
        if let Some(truth) = &self.ground_truth {
            if truth.dim() != object_size.shape() {
                return Err(SpeckleError::config(
                    "ground_truth",
                    format!(
                        "shape {:?} does not match object size {:?}",
                        truth.dim(),
                        object_size.shape()
                    ),
                ));
            }
            if truth.iter().any(|v| !v.is_finite()) {
                return Err(SpeckleError::config(
                    "ground_truth",
                    "contains non-finite values",
                ));
            }
        }

        Ok(ReconstructorConfig {
            object_size,
            inversion_model: self.inversion_model,
            noise_model: self.noise_model,
            sigma_w,
            max_iters: self.max_iters,
            sigma_lambda,
            sigma_n,
            denoiser: self.denoiser,
            likelihood: self.likelihood,
            ground_truth: self.ground_truth,
            real_only: self.real_only,
            record_trace: self.record_trace,
            tv_iterations: self.tv_iterations,
        })
    }
}

/// On-disk JSON form. Option names are plain strings so that unsupported
/// names surface as configuration errors rather than JSON errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub object_size: Vec<usize>,
    pub sigma_w: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inversion_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_model: Option<String>,
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
    #[serde(default = "default_sigma_lambda")]
    pub sigma_lambda: f64,
    #[serde(default = "default_sigma_n")]
    pub sigma_n: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denoiser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<String>,
    #[serde(default = "default_true")]
    pub real_only: bool,
    #[serde(default)]
    pub record_trace: bool,
    #[serde(default = "default_tv_iterations")]
    pub tv_iterations: usize,
}

fn default_max_iters() -> usize {
    DEFAULT_MAX_ITERS
}
fn default_sigma_lambda() -> f64 {
    DEFAULT_SIGMA_LAMBDA
}
fn default_sigma_n() -> f64 {
    DEFAULT_SIGMA_N
}
fn default_true() -> bool {
    true
}
fn default_tv_iterations() -> usize {
    DEFAULT_TV_ITERATIONS
}

fn parse_or_default<T: FromStr<Err = SpeckleError> + Default>(
    value: Option<&str>,
) -> SpeckleResult<T> {
    value.map_or_else(|| Ok(T::default()), str::parse)
}

impl ConfigFile {
    pub fn into_config(self) -> SpeckleResult<ReconstructorConfig> {
        ReconstructorConfig::builder(&self.object_size, self.sigma_w)
            .inversion_model(parse_or_default(self.inversion_model.as_deref())?)
            .noise_model(parse_or_default(self.noise_model.as_deref())?)
            .denoiser(parse_or_default(self.denoiser.as_deref())?)
            .likelihood(parse_or_default(self.likelihood.as_deref())?)
            .max_iters(self.max_iters)
            .sigma_lambda(self.sigma_lambda)
            .sigma_n(self.sigma_n)
            .real_only(self.real_only)
            .record_trace(self.record_trace)
            .tv_iterations(self.tv_iterations)
            .build()
    }
}

impl From<&ReconstructorConfig> for ConfigFile {
    fn from(cfg: &ReconstructorConfig) -> Self {
        ConfigFile {
            object_size: vec![cfg.object_size.rows, cfg.object_size.cols],
            sigma_w: cfg.sigma_w,
            inversion_model: Some(cfg.inversion_model.to_string()),
            noise_model: Some(cfg.noise_model.to_string()),
            max_iters: cfg.max_iters,
            sigma_lambda: cfg.sigma_lambda,
            sigma_n: cfg.sigma_n,
            denoiser: Some(cfg.denoiser.to_string()),
            likelihood: Some(cfg.likelihood.to_string()),
            real_only: cfg.real_only,
            record_trace: cfg.record_trace,
            tv_iterations: cfg.tv_iterations,
        }
    }
}

//! Mathematical primitives for speckle reflectance reconstruction.

pub mod fft;
pub mod metrics;
pub mod roots;
pub mod spectral;
pub mod tv;

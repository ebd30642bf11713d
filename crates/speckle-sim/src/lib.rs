// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Simulation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Synthetic data for exercising the reconstructor: reflectance phantoms
//! and a seeded coherent-imaging forward model.

pub mod forward;
pub mod phantom;

pub use forward::{SimulatedMeasurement, SpeckleSimulator};

//! Fastcauldron: the layer and subdomain core of a basin modelling simulator
//!
//! The crate builds the distributed areal grid of a basin, the stratigraphic
//! formations deposited over geological time, and the Darcy subdomains whose
//! degrees of freedom are numbered across degenerate (zero-thickness) segments.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod grid;
pub mod layer;
pub mod mcf;
pub mod parallel;
pub mod prelude;
pub mod simulator;
pub mod subdomain;

//! Implements the base structures shared by the whole simulator

mod config;
mod constants;
mod diagnostics;
mod enums;
mod poly_function;
pub use crate::base::config::*;
pub use crate::base::constants::*;
pub use crate::base::diagnostics::*;
pub use crate::base::enums::*;
pub use crate::base::poly_function::*;

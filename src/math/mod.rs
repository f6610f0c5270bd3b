//! Derivative-free minimizers: bounded Nelder–Mead (local) and differential
//! evolution (global), both over an axis-aligned search box.

pub mod differential_evolution;
pub mod nelder_mead;
pub mod search_box;

pub use differential_evolution::*;
pub use nelder_mead::*;
pub use search_box::*;

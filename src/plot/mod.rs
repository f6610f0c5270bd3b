//! Plot rendering: PNG charts for the results directory and an ASCII preview
//! for the terminal.

pub mod ascii;
pub mod png;

pub use ascii::*;
pub use png::*;

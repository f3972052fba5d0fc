//! Satlab SRS-4 Spaceframe codec and idle frame generators.

mod idle;
mod spaceframe;

pub use idle::*;
pub use spaceframe::*;

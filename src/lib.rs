#![doc = include_str!("../README.md")]

mod error;

pub mod adapter;
pub mod crc;
pub mod csp;
pub mod framing;
pub mod openlst;
pub mod satlab;

pub use error::{Error, Result};

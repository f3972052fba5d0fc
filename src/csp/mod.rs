//! Cubesat Space Protocol packet codecs.
//!
//! Two header generations are in active use: v1 packs its fields into 32
//! bits, v2 into 48 bits. Both are big-endian on the wire. Note the address
//! field order differs between the two: v1 carries source before
//! destination, v2 destination before source.

pub mod v1;
pub mod v2;

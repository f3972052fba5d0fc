//! OpenLST radio packet codecs.
//!
//! Three packet shapes cross an OpenLST link: [`ClientPacket`] between
//! ground software and the ground radio, [`VehiclePacket`] between the
//! flight radio and the spacecraft bus, and [`SpacePacket`] over the RF
//! link itself. All three are little-endian on the wire, in contrast to the
//! big-endian CSP and Spaceframe formats.

pub mod client;
pub mod space;
pub mod vehicle;

pub use client::{ClientPacket, ClientPacketHeader};
pub use space::{SpacePacket, SpacePacketFooter, SpacePacketHeader};
pub use vehicle::{VehiclePacket, VehiclePacketHeader};

//! fleetcapd — process wiring shared by the binary and its tests.

pub mod app;

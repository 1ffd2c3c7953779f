//! Register access layer implementations.
//!
//! This module provides the two backing stores for the [`RegisterBus`] seam:
//! - [`MmioBus`] - volatile memory-mapped I/O for real hardware
//! - [`MockBus`] - a simulated register file for tests
//!
//! The register access layer is the only place physical addresses appear.
//! Everything above it (the console and CAN controller drivers) is written
//! against the trait, so the identical driver code runs on hardware and in
//! the test harness. Each `read`/`write` call is exactly one 8-bit bus
//! transaction; ordering between adjacent calls is preserved, since the
//! device register sequences are meaningful to the hardware.
//!
//! [`RegisterBus`]: crate::types::RegisterBus

pub mod mmio;
pub mod mock;

pub use mmio::MmioBus;
pub use mock::{BusAccess, MockBus};

//! Greenhouse controller core.
//!
//! Five cooperating loops share one state store and talk only through
//! asynchronous notifications:
//!
//! - [`sensing`] polls temperature/humidity and publishes changes,
//! - [`decision`] recomputes actuator intents from readings and thresholds,
//! - [`actuation`] drives the heater/cooler/pump lines,
//! - [`terminal`] parses the serial byte stream into threshold updates,
//! - [`display`] repaints the affected parts of the active screen.
//!
//! Hardware is reached only through the [`ports`] traits, so the whole core
//! builds and tests on the host; the firmware binary supplies the adapters
//! and spawns each loop as an embassy task.

#![cfg_attr(not(test), no_std)]

pub mod actuation;
pub mod decision;
pub mod display;
pub mod event;
pub mod ports;
pub mod sensing;
pub mod store;
pub mod terminal;

pub use event::EventBus;
pub use store::Store;

/// Startup banner, written to the byte stream before the loops start.
pub const BANNER: &str = "System started\r\n";

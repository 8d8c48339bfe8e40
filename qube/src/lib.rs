#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! The QuBE synchronized acquisition engine.
//!
//! A [`QubeController`] owns every discovered chassis and device. Each client
//! holds a [`Session`] that selects a device and records the channels armed
//! for the next trigger.

/// Opening the hardware of a chassis.
pub mod backend;
/// Server configuration.
pub mod config;
/// The engine and its settings.
pub mod controller;
/// Error definitions.
pub mod error;
/// Channels armed in a session.
pub mod ledger;
/// Commonly used items.
pub mod prelude;
/// Per-client state.
pub mod session;
/// Synchronized trigger planning.
pub mod trigger;

pub use qube_driver as driver;

pub use controller::QubeController;
pub use session::Session;

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! A TCP server of the QuBE synchronized acquisition engine.
//!
//! Requests are newline-delimited JSON objects. See [`Request`] for the settings.

/// Error definitions.
pub mod error;
/// Requests, responses and their dispatch.
pub mod request;
mod server;

pub use error::ServerError;
pub use request::{Request, Response};
pub use server::QubeServer;

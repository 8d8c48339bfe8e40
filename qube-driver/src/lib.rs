#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! A driver of QuBE control and readout lines.

/// Readout acquisition settings and the capture DSP compiler.
pub mod acquisition;
/// Devices and their capabilities.
pub mod device;
/// Error definitions.
pub mod error;

pub use qube_core as core;

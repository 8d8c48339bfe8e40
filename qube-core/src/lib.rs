#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Core traits and types for QuBE.

/// Common constants and types.
pub mod common;
/// Descriptors written to the AWG and capture hardware.
pub mod descriptor;
/// Interfaces to the chassis hardware.
pub mod link;

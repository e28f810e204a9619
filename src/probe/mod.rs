//! Probe client subsystem.
//!
//! The engine only sees the `ProbeClient` trait; transport details stay
//! behind it. `Http3Client` is the production implementation, tests inject
//! scripted fakes.

pub mod client;
pub mod http3;

pub use client::{canonical_header_name, HeaderFields, ProbeClient, ProbeError, ProbeOutcome};
pub use http3::{ClientBuildError, Http3Client};

//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger → engine closes run → unsettled targets expire → report written
//!
//! Signals (signals.rs):
//!     SIGINT → trigger shutdown
//!     second SIGINT → exit immediately
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

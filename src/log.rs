//! Engine logging.
//!
//! With the `tracing` feature these are the `tracing` macros. Without it
//! they swallow their arguments, so call sites never need a `cfg`.
//!
//! Levels used by the engine:
//! - `warn!`: a failed element update, a refused cycle, dropped deferred work
//! - `debug!`: registration, removal, rejected values, skipped passes
//! - `trace!`: one line per recomputed element

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, trace, warn};

//! Domain Services
//!
//! Pure, synchronous decision logic. Nothing here performs I/O.

mod record_builder;
mod routing;
mod triage;

pub use record_builder::*;
pub use routing::*;
pub use triage::*;

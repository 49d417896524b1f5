//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod call_state;
mod destination;
mod emergency_type;
mod location_class;
mod priority;

pub use call_state::*;
pub use destination::*;
pub use emergency_type::*;
pub use location_class::*;
pub use priority::*;

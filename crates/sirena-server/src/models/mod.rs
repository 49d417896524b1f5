//! Sirena API Models
//!
//! - Call: intake request, stored record, handling outcome
//! - Dispatch: messaging endpoint and destination status

mod call;
mod dispatch;

pub use call::*;
pub use dispatch::*;

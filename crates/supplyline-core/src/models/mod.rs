//! Domain models for the supplyline console.

mod acknowledgment;
mod inventory;
mod listing;
mod related;
mod shipment;
mod study;

pub use acknowledgment::*;
pub use inventory::*;
pub use listing::*;
pub use related::*;
pub use shipment::*;
pub use study::*;

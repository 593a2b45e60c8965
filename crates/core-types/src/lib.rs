pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{CloseReason, DealKind, Direction, EntryKind};
pub use error::CoreError;
pub use structs::{Deal, Order, RawDeal, RawOrder, Snapshot, Window};

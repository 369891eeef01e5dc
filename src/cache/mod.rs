pub mod store;
pub mod views;

pub use store::{Collection, SnapshotStore};

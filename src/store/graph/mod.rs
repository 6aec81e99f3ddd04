//! Entity graph operations
//!
//! One file per entity kind. Every mutating operation here runs as one
//! transaction: capability check, the row change, and (for boxes and
//! instances) the audit record, committing together or not at all.

mod boxes;
mod category;
mod instance;
mod item;
mod location;
mod photo;

pub use boxes::BoxUpdate;
pub use instance::InstanceUpdate;
pub use location::LocationUpdate;

pub(crate) use boxes::fetch_boxes_in_home;
pub(crate) use instance::fetch_instances_in_box;

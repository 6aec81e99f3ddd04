//! Entity type definitions
//!
//! The inventory graph below each home:
//!
//! **Tenancy:**
//! - [`Home`] - The tenant and isolation root
//! - [`Membership`] - Grants an identity a [`Role`] within one home
//!
//! **Inventory:**
//! - [`Location`] - The house / room / zone tree
//! - [`Category`] - Per-home item grouping with case-insensitive unique names
//! - [`StorageBox`] - Physical container with a globally unique scan token
//! - [`Item`] - The concept of a thing
//! - [`ItemInstance`] - A physical placement of an item in a box
//! - [`Photo`] - Locator for a picture of an item, box, or invoice
//!
//! **Bookkeeping:**
//! - [`AuditRecord`] - Immutable before/after snapshot of a mutation

pub mod audit;
pub mod category;
pub mod home;
pub mod instance;
pub mod item;
pub mod location;
pub mod photo;
pub mod storage_box;

pub use audit::{AuditOp, AuditRecord};
pub use category::Category;
pub use home::{Home, Membership, Role};
pub use instance::{InstanceStatus, ItemInstance};
pub use item::Item;
pub use location::{Location, LocationKind};
pub use photo::{Photo, PhotoOwner};
pub use storage_box::{generate_scan_token, StorageBox};

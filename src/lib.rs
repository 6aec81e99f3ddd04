//! boxroom: multi-tenant home inventory core
//!
//! A library (plus thin CLI) managing homes, locations, categories, boxes,
//! items, and item instances, with per-row tenant isolation and a
//! transactional audit trail. Every mutation runs authorization, the row
//! change, the audit record, and the timestamp stamp in one SQLite
//! transaction.

pub mod cli;
pub mod core;
pub mod entities;
pub mod store;

//! Command implementations, one module per noun

pub mod audit;
pub mod boxes;
pub mod cat;
pub mod home;
pub mod inst;
pub mod item;
pub mod loc;
pub mod member;
pub mod photo;

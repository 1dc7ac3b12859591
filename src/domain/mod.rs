//! Tavola Domain Concerns

pub mod carts;
pub mod catalog;
pub mod orders;
pub mod owners;

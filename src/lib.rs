//! Tavola
//!
//! Backend for a food-ordering marketplace: a restaurant/dish catalog, a
//! cart ownership store keyed by authenticated user or anonymous session,
//! and order records produced at checkout.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

pub mod uuids;

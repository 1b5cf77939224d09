//! Data access and domain logic over PostgreSQL.
//!
//! Every operation takes the pool (or a transaction) and the caller identity
//! explicitly; there is no process-wide state.

pub mod cart;
pub mod orders;
pub mod products;
pub mod seed;
pub mod users;

//! Critica domain logic.
//!
//! Everything here is pure: no database, no HTTP. The `db` and `api` crates
//! build on these types and predicates.

pub mod confirmation;
pub mod error;
pub mod pagination;
pub mod permissions;
pub mod rating;
pub mod roles;
pub mod types;
pub mod validation;

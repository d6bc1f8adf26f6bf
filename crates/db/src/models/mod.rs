//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row (serialized directly
//!   where the row is already the public representation)
//! - `Deserialize` + `Validate` create DTOs for inserts
//! - `Deserialize` + `Validate` update DTOs (all `Option` fields) for patches

use serde::{Deserialize, Deserializer};

pub mod category;
pub mod comment;
pub mod genre;
pub mod review;
pub mod title;
pub mod user;

/// Deserialize a present field as `Some(value)` so that, combined with
/// `#[serde(default)]`, a missing field (`None`) can be told apart from an
/// explicit `null` (`Some(None)`).
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//! - [`confirmation`] -- Issuing and checking signup confirmation codes.

pub mod confirmation;
pub mod jwt;

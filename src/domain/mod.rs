//! Domain types and DTOs
//!
//! Request/response shapes, persisted records and the validation rules that
//! go with them.

pub mod catalog;
pub mod designs;
pub mod materials;
pub mod orders;
pub mod validation;

pub use designs::*;
pub use materials::*;
pub use orders::*;

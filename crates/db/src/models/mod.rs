//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - View structs for read endpoints that join across tables

pub mod friendship;
pub mod meeting;
pub mod note;
pub mod presence;
pub mod session;
pub mod user;

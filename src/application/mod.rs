//! Application services layer.

pub mod admin;
pub mod error;
pub mod kv;
pub mod pagination;
pub mod password;
pub mod repos;
pub mod roles;

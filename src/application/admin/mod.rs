//! Application services for the administrative surface.

pub mod settings;
pub mod users;

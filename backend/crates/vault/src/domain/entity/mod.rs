//! Domain Entities

pub mod user;
pub mod user_data;

//! Value Object Module

pub mod api_key;

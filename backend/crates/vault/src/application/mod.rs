pub mod config;
pub mod data;
pub mod gate;
pub mod issue_key;
pub mod register;

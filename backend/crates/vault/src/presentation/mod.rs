//! Presentation Layer
//!
//! HTTP handlers and router.

pub mod extract;
pub mod handlers;
pub mod router;

pub use router::{vault_router, vault_router_generic};

//! HTTP handlers
//!
//! Thin JSON adapters over the account and pass services.

pub mod accounts;
pub mod passes;
pub mod sessions;

pub use accounts::{me, register};
pub use passes::{delete_pass, list_passes, pass_history, submit_pass};
pub use sessions::{login, logout};

#![doc(test(attr(deny(warnings))))]

//! TurboCash tracks personal budgets, goals and subscriptions and flags
//! budgets that are on course to overspend before their period ends.
//!
//! The domain model, analytics, JSON storage and configuration live in the
//! `turbocash-*` crates; this crate ties them into a user session and a CLI.

pub mod cli;
pub mod config;
pub mod errors;
pub mod session;
pub mod utils;

pub use errors::{CashError, Result};
pub use session::{BudgetRiskRow, UserSession};
pub use turbocash_core;
pub use turbocash_domain;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("TurboCash tracing initialized.");
    });
}

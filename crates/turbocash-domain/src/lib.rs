//! turbocash-domain
//!
//! Pure domain models (Budget, Transaction, Goal, Subscription, UserData, etc.).
//! No I/O, no CLI, no storage. Only data types, calendar arithmetic and
//! boundary validation.

pub mod budget;
pub mod calendar;
pub mod common;
pub mod dates;
pub mod error;
pub mod goal;
pub mod risk;
pub mod subscription;
pub mod transaction;
pub mod user;

pub use budget::*;
pub use common::*;
pub use error::ValidationError;
pub use goal::*;
pub use risk::*;
pub use subscription::*;
pub use transaction::*;
pub use user::*;

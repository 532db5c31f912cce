//! turbocash-core
//!
//! Budget analytics and business services for TurboCash.
//! Depends on turbocash-domain. No CLI, no terminal I/O, no filesystem access.

pub mod analytics;
pub mod currency;
pub mod error;
pub mod services;
pub mod storage;
pub mod time;

pub use analytics::*;
pub use error::{CoreError, CoreResult};
pub use services::*;
pub use storage::{LoadedDocument, MemoryUserStore, UserStore};
pub use time::{Clock, FixedClock, SystemClock};

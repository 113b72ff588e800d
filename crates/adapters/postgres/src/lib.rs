//! storefront-adapter-postgres - PostgreSQL 适配器

mod config;
mod connection;
mod error;
mod retry;
mod transaction;

pub use config::*;
pub use connection::*;
pub use error::*;
pub use retry::*;
pub use transaction::*;

// Database layer module
// Pool lifecycle, sessions, and repositories for the events store

pub mod pool;
pub mod repositories;
pub mod session;

pub use pool::DbPool;
pub use session::{Session, StatusDescriptor};

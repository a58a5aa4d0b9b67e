mod config;
pub use config::{PoolConfig, DEFAULT_REAP_INTERVAL};

mod error;
pub use error::{ConfigError, PoolError};

mod pool;
pub use pool::Pool;

mod reaper;

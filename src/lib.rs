mod pool;
pub use self::pool::{ConfigError, Pool, PoolConfig, PoolError, DEFAULT_REAP_INTERVAL};

mod resource;
pub use self::resource::Resource;

//! Cycle log construction from configuration.

use std::path::Path;

use birdbone_core::config::StorageConfig;
use birdbone_core::errors::BirdboneResult;
use birdbone_storage::SqliteCycleLog;

/// Path value that selects an in-memory log.
pub const IN_MEMORY: &str = ":memory:";

/// Open the cycle log named by `config.db_path`.
pub fn open_cycle_log(config: &StorageConfig) -> BirdboneResult<SqliteCycleLog> {
    if config.db_path == IN_MEMORY {
        SqliteCycleLog::open_in_memory()
    } else {
        SqliteCycleLog::open(Path::new(&config.db_path), config)
    }
}

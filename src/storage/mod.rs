pub mod duckdb;
pub mod traits;

pub use self::duckdb::DuckDbStorage;
pub use traits::{Storage, StorageError};

use crate::config::types::{StorageBackend, StorageConfig};
use std::sync::Arc;

/// Open the configured backend. The schema still has to be initialized.
pub fn open_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, StorageError> {
    let storage = match config.backend {
        StorageBackend::Duckdb => {
            let path = config.path.as_ref().ok_or_else(|| {
                StorageError::Config("duckdb backend requires storage.path".to_string())
            })?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Config(format!(
                        "cannot create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            tracing::info!(path = %path.display(), "Opening DuckDB storage");
            DuckDbStorage::new(path)?
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, batches are lost on shutdown");
            DuckDbStorage::in_memory()?
        }
    };

    Ok(Arc::new(storage))
}

use crate::{
    config::{BackendKind, StorageConfig},
    postgres_storage::PostgresStorage,
    sqlite_storage::SqliteStorage,
    storage::{FullStorage, InMemoryStorage, PartialStorage, StorageError},
};

/// The storage backend chosen by configuration.
///
/// Every variant stores salaries and expenses. Only the in-memory backend also
/// stores regional expenses, which is why callers ask for [`Backend::full`]
/// instead of getting regional operations that fail at call time.
pub enum Backend {
    Memory(InMemoryStorage),
    Sqlite(SqliteStorage),
    Postgres(PostgresStorage),
}

impl Backend {
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        let backend = match config.backend {
            BackendKind::Memory => Backend::Memory(InMemoryStorage::new()),
            BackendKind::Sqlite => Backend::Sqlite(SqliteStorage::new(&config.sqlite_path)?),
            BackendKind::Postgres => {
                let url = config.postgres_url.as_deref().ok_or_else(|| {
                    StorageError::Other("storage.postgres_url is required for the postgres backend".to_string())
                })?;
                Backend::Postgres(PostgresStorage::new(url)?)
            }
        };
        tracing::info!(backend = backend.name(), "Storage backend ready");
        Ok(backend)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory(_) => "memory",
            Backend::Sqlite(_) => "sqlite",
            Backend::Postgres(_) => "postgres",
        }
    }

    pub fn partial(&self) -> &dyn PartialStorage {
        match self {
            Backend::Memory(s) => s,
            Backend::Sqlite(s) => s,
            Backend::Postgres(s) => s,
        }
    }

    pub fn full(&self) -> Option<&dyn FullStorage> {
        match self {
            Backend::Memory(s) => Some(s),
            Backend::Sqlite(_) | Backend::Postgres(_) => None,
        }
    }
}

//! MongoDB client factory and the storage error shared by repositories.

use bson::doc;
use longbox_kernel::settings::DatabaseSettings;
use mongodb::{options::ClientOptions, Client, Database};
use thiserror::Error;

/// Failures raised by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store could not be reached or the connection string is invalid.
    #[error("connection error: {0}")]
    Connection(String),
    /// The store rejected or failed an operation.
    #[error("backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Build a client from the configured URI and return a handle to the
/// configured database after a successful `ping`.
pub async fn connect(settings: &DatabaseSettings) -> StorageResult<Database> {
    let mut options = ClientOptions::parse(&settings.uri)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
    options.app_name = Some("longbox".to_string());

    let client =
        Client::with_options(options).map_err(|e| StorageError::Connection(e.to_string()))?;
    let database = client.database(&settings.name);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    tracing::info!(
        target: "longbox-db",
        database = %settings.name,
        "connected to MongoDB"
    );

    Ok(database)
}

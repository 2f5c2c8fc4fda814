pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Movie with title {0:?} already exists")]
    DuplicateTitle(String),

    #[error("Invalid order by field: {0}")]
    InvalidOrderByField(String),

    #[error("Invalid value stored in column {column}: {value}")]
    InvalidStoredValue { column: &'static str, value: String },
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for sla_monitor_core::Error {
    fn from(value: Error) -> Self {
        sla_monitor_core::Error::Persistence(value.to_string())
    }
}

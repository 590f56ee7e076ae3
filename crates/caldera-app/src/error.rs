use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    StoreError(#[from] caldera_store::StoreError),

    #[error(transparent)]
    CoreError(#[from] caldera_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

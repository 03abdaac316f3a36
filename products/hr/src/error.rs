use platform_api::ApiError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Database(DbErr),
}

pub type HrResult<T> = Result<T, HrError>;

impl HrError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<DbErr> for HrError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                HrError::Conflict(format!("duplicate record: {detail}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                HrError::Validation(format!("referenced record missing: {detail}"))
            }
            _ => HrError::Database(err),
        }
    }
}

impl From<HrError> for ApiError {
    fn from(err: HrError) -> Self {
        match err {
            HrError::NotFound { entity, .. } => ApiError::NotFound(entity.to_string()),
            HrError::Validation(msg) => ApiError::InvalidInput(msg),
            HrError::Conflict(msg) => ApiError::Conflict(msg),
            HrError::InvalidCredentials => ApiError::Unauthorized,
            HrError::Database(db) => ApiError::internal(db.into()),
        }
    }
}

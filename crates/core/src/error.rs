#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read records file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to create export directory: {0}")]
    ExportDirCreation(std::io::Error),
    #[error("failed to write export file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to deserialize records: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to serialize merged record: {0}")]
    Serialization(serde_json::Error),
    #[error("invalid user id configuration: {0}")]
    UserId(#[from] ontop_uuid::UserIdError),
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;

use thiserror::Error;

/// Internal error type for store and service operations
///
/// Separates infrastructure errors (Database, Transaction, Parse, Crypto,
/// Io, ModelArtifact) shared by all stores from domain errors specific to
/// each store.
///
/// This error type is NOT exposed via API. API endpoints must explicitly
/// convert these to AuthError or ClinicalError; unexpected variants become
/// an opaque 500 while the detail goes to the server log.
#[derive(Error, Debug)]
pub enum InternalError {
    /// Database query or operation failed
    #[error("Database error: {operation} failed: {source}")]
    Database {
        operation: String,
        #[source]
        source: sea_orm::DbErr,
    },

    /// Database transaction failed
    #[error("Transaction error: {operation} failed: {source}")]
    Transaction {
        operation: String,
        #[source]
        source: sea_orm::DbErr,
    },

    /// Failed to parse a value (role string, timestamp, JSON, etc.)
    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse { value_type: String, message: String },

    /// Cryptographic operation failed (hashing, verification, etc.)
    #[error("Crypto error: {operation} failed: {message}")]
    Crypto { operation: String, message: String },

    /// Filesystem operation failed (upload storage)
    #[error("Io error: {operation} failed: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Classifier artifact missing, unreadable, or shape-inconsistent
    #[error("Model artifact error: {artifact}: {message}")]
    ModelArtifact { artifact: String, message: String },

    /// Credential store errors (authentication, user management, tokens)
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Patient store errors (record creation, appends, predictions)
    #[error(transparent)]
    Patient(#[from] PatientError),
}

impl InternalError {
    /// Create a database error with context
    pub fn database(operation: impl Into<String>, source: sea_orm::DbErr) -> Self {
        Self::Database {
            operation: operation.into(),
            source,
        }
    }

    /// Create a transaction error with context
    pub fn transaction(operation: impl Into<String>, source: sea_orm::DbErr) -> Self {
        Self::Transaction {
            operation: operation.into(),
            source,
        }
    }

    /// Create a parse error with context
    pub fn parse(value_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            value_type: value_type.into(),
            message: message.into(),
        }
    }

    /// Create a crypto error with context
    pub fn crypto(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Crypto {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an io error with context
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a model artifact error with context
    pub fn model_artifact(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelArtifact {
            artifact: artifact.into(),
            message: message.into(),
        }
    }
}

/// Credential store specific errors
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Invalid username or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Username already exists
    #[error("User already exists: {0}")]
    DuplicateUsername(String),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),

    /// Invalid or malformed token
    #[error("Invalid token: {token_type} - {reason}")]
    InvalidToken { token_type: String, reason: String },

    /// Token has expired
    #[error("Expired token: {0}")]
    ExpiredToken(String),
}

impl CredentialError {
    /// Create an invalid token error
    pub fn invalid_token(token_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            token_type: token_type.into(),
            reason: reason.into(),
        }
    }
}

/// Patient store specific errors
#[derive(Error, Debug)]
pub enum PatientError {
    /// Patient identifier already taken (checked against the identity table,
    /// with the paired insert done in the same transaction)
    #[error("Patient ID already exists: {0}")]
    DuplicateId(String),

    /// Operation targeted an unknown patient id
    #[error("Patient not found: {0}")]
    NotFound(String),

    /// Uploaded file extension outside the accepted set
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
}

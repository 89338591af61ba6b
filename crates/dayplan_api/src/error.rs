//! Status-classified API failures.

use dayplan_core::db::DbError;
use dayplan_core::{DateFormatError, RecurrenceError, RepoError, TaskServiceError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure class, mapped onto an HTTP-style status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Caller sent something invalid: bad id, date, rule or title.
    BadRequest,
    NotFound,
    /// Storage failure or corrupted stored data.
    Internal,
}

impl ApiErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }

    /// Stable lowercase label used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::BadRequest, message)
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Renders the `{"error": "..."}` response body.
    pub fn to_json(&self) -> String {
        serde_json::json!({ "error": self.message }).to_string()
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ApiError {}

impl From<TaskServiceError> for ApiError {
    fn from(value: TaskServiceError) -> Self {
        let kind = match &value {
            TaskServiceError::Validation(_) | TaskServiceError::Recurrence(_) => {
                ApiErrorKind::BadRequest
            }
            TaskServiceError::TaskNotFound(_) => ApiErrorKind::NotFound,
            TaskServiceError::Repo(_) => ApiErrorKind::Internal,
        };
        Self::new(kind, value.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        TaskServiceError::from(value).into()
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::new(ApiErrorKind::Internal, format!("task store unavailable: {value}"))
    }
}

impl From<RecurrenceError> for ApiError {
    fn from(value: RecurrenceError) -> Self {
        Self::bad_request(value.to_string())
    }
}

impl From<DateFormatError> for ApiError {
    fn from(value: DateFormatError) -> Self {
        Self::bad_request(value.to_string())
    }
}

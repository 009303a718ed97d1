use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::path::PathBuf;

/// Errors surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("access to {0:?} is not allowed")]
    PathTraversal(PathBuf),

    #[error("invalid form data: {0}")]
    InvalidForm(String),

    #[error("{0:?} does not exist")]
    NotFound(PathBuf),

    #[error("{0:?} is not a regular file")]
    NotAFile(PathBuf),

    #[error("cannot read directory {path:?}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed multipart payload: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::PathTraversal(_) => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidForm(_)
            | ServerError::NotAFile(_)
            | ServerError::DirectoryUnavailable { .. }
            | ServerError::Multipart(_) => StatusCode::BAD_REQUEST,
            ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Paths stay in the server log; clients only see a generic reason.
        let body = match self {
            ServerError::PathTraversal(_) => "Forbidden".to_string(),
            ServerError::NotFound(_) => "Not Found".to_string(),
            ServerError::DirectoryUnavailable { .. } | ServerError::NotAFile(_) => {
                "Bad Request".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}

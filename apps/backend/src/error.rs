use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::trace_ctx;

/// RFC 7807 problem-details body attached to every error response.
#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: &'static str, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: &'static str, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: &'static str, detail: String },
    #[error("Unavailable: {detail}")]
    Unavailable { code: &'static str, detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation { code, .. } => code,
            AppError::NotFound { code, .. } => code,
            AppError::Conflict { code, .. } => code,
            AppError::Unavailable { code, .. } => code,
            AppError::Internal { .. } => "INTERNAL",
            AppError::Config { .. } => "CONFIG_ERROR",
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Unavailable { detail, .. }
            | AppError::Internal { detail }
            | AppError::Config { detail } => detail.clone(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let detail = err.to_string();
        match err {
            DomainError::Validation(_) => AppError::Validation {
                code: "VALIDATION",
                detail,
            },
            DomainError::NotFound(kind, _) => AppError::NotFound {
                code: match kind {
                    NotFoundKind::Room => "ROOM_NOT_FOUND",
                    NotFoundKind::Session => "SESSION_NOT_FOUND",
                    NotFoundKind::Participant => "PARTICIPANT_NOT_FOUND",
                    NotFoundKind::Card => "CARD_NOT_FOUND",
                },
                detail,
            },
            DomainError::StateConflict(kind, _) => AppError::Conflict {
                code: match kind {
                    ConflictKind::AlreadyLockedIn => "ALREADY_LOCKED_IN",
                    ConflictKind::LensAlreadySet => "LENS_ALREADY_SET",
                    ConflictKind::PhaseMismatch => "PHASE_MISMATCH",
                    ConflictKind::NoPreviousRole => "NO_PREVIOUS_ROLE",
                },
                detail,
            },
            DomainError::CardExhausted(_) => AppError::Conflict {
                code: "CARD_EXHAUSTED",
                detail,
            },
            DomainError::InvalidCombination => AppError::Validation {
                code: "INVALID_COMBINATION",
                detail,
            },
            DomainError::RoomFull => AppError::Conflict {
                code: "ROOM_FULL",
                detail,
            },
            DomainError::ContentUnavailable(_) => AppError::Unavailable {
                code: "CONTENT_UNAVAILABLE",
                detail,
            },
            DomainError::RoundClosed => AppError::Conflict {
                code: "ROUND_CLOSED",
                detail,
            },
        }
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().to_string();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://huddle.gg/errors/{code}"),
            title: Self::humanize_code(&code),
            status: status.as_u16(),
            detail: self.detail(),
            code,
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}

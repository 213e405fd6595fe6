use actix_web::http::StatusCode;

use crate::domain::SpecialCard;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};

fn app(err: DomainError) -> AppError {
    err.into()
}

#[test]
fn not_found_maps_to_404() {
    for (kind, code) in [
        (NotFoundKind::Room, "ROOM_NOT_FOUND"),
        (NotFoundKind::Session, "SESSION_NOT_FOUND"),
        (NotFoundKind::Participant, "PARTICIPANT_NOT_FOUND"),
        (NotFoundKind::Card, "CARD_NOT_FOUND"),
    ] {
        let err = app(DomainError::not_found(kind, "missing"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        match err {
            AppError::NotFound { code: c, .. } => assert_eq!(c, code),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}

#[test]
fn state_conflicts_map_to_409() {
    for (kind, code) in [
        (ConflictKind::AlreadyLockedIn, "ALREADY_LOCKED_IN"),
        (ConflictKind::LensAlreadySet, "LENS_ALREADY_SET"),
        (ConflictKind::PhaseMismatch, "PHASE_MISMATCH"),
        (ConflictKind::NoPreviousRole, "NO_PREVIOUS_ROLE"),
    ] {
        let err = app(DomainError::conflict(kind, "bad timing"));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        match err {
            AppError::Conflict { code: c, .. } => assert_eq!(c, code),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }
}

#[test]
fn card_exhausted_and_room_full_are_conflicts() {
    let err = app(DomainError::CardExhausted(SpecialCard::GuaranteedScore));
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let err = app(DomainError::RoomFull);
    assert_eq!(err.status(), StatusCode::CONFLICT);
    match err {
        AppError::Conflict { code, .. } => assert_eq!(code, "ROOM_FULL"),
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[test]
fn round_closed_is_a_conflict() {
    let err = app(DomainError::RoundClosed);
    assert_eq!(err.status(), StatusCode::CONFLICT);
    match err {
        AppError::Conflict { code, .. } => assert_eq!(code, "ROUND_CLOSED"),
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[test]
fn invalid_combination_is_a_validation_error() {
    let err = app(DomainError::InvalidCombination);
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    match err {
        AppError::Validation { code, .. } => assert_eq!(code, "INVALID_COMBINATION"),
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[test]
fn content_unavailable_maps_to_503() {
    let err = app(DomainError::ContentUnavailable("catalog down".into()));
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    match err {
        AppError::Unavailable { code, .. } => assert_eq!(code, "CONTENT_UNAVAILABLE"),
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[test]
fn validation_carries_detail_through() {
    let err = app(DomainError::validation("synergy card 9 not in hand"));
    match err {
        AppError::Validation { code, detail } => {
            assert_eq!(code, "VALIDATION");
            assert!(detail.contains("synergy card 9"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

//! Token lifecycle laws (spec §8, scenario S5): revocation and expiry are
//! terminal, refresh rotation keeps exactly one live access token per
//! refresh chain, and exchange never invalidates the subject token.

use chrono::{Duration, Utc};
use iam_core::core::clock::FixedClock;
use iam_core::core::token::TokenType;
use iam_core::services::{IssueRequest, TokenService, TokenSigningConfig};
use std::sync::Arc;

fn service() -> (TokenService, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(Utc::now()));
    (TokenService::new(TokenSigningConfig::default(), clock.clone()), clock)
}

#[test]
fn revoked_token_stays_invalid_even_after_a_second_revoke_call() {
    let (service, _clock) = service();
    let (_token, record) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
    service.revoke(&record.id).unwrap();
    service.revoke(&record.id).unwrap();
    let outcome = service.validate(&record.id);
    assert!(!outcome.valid);
    assert!(outcome.revoked);
}

#[test]
fn consumed_token_is_rejected_by_validate() {
    let (service, _clock) = service();
    let (_token, record) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
    service.consume(&record.id).unwrap();
    let outcome = service.validate(&record.id);
    assert!(!outcome.valid);
    assert!(outcome.consumed);
}

#[test]
fn refresh_chain_never_leaves_two_live_access_tokens() {
    let (service, _clock) = service();
    let (_access_token, access_record) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
    let mut refresh_request = IssueRequest::new(TokenType::Refresh, "u1");
    refresh_request.parent_token_id = Some(access_record.id.clone());
    let (_refresh_token, refresh_record) = service.issue(refresh_request);

    let (_new_access, new_record) = service.refresh_access_token(&refresh_record.id).unwrap();
    let (_newer_access, newer_record) = service.refresh_access_token(&refresh_record.id).unwrap();

    assert!(!service.validate(&access_record.id).valid);
    assert!(!service.validate(&new_record.id).valid);
    assert!(service.validate(&newer_record.id).valid);
}

#[test]
fn revoke_all_for_identity_invalidates_every_outstanding_token() {
    let (service, _clock) = service();
    let (_t1, r1) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
    let (_t2, r2) = service.issue(IssueRequest::new(TokenType::Refresh, "u1"));
    service.revoke_all_for_identity("u1");
    assert!(!service.validate(&r1.id).valid);
    assert!(!service.validate(&r2.id).valid);
}

#[test]
fn exchange_never_invalidates_the_subject_token() {
    let (service, _clock) = service();
    let (_subject_token, subject_record) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
    let (_new_token, _new_record, _refresh) = service
        .exchange(&subject_record.id, None, TokenType::Access, "urn:ietf:params:oauth:token-type:access_token", None)
        .unwrap();
    assert!(service.validate(&subject_record.id).valid);
}

#[test]
fn expiry_is_terminal_even_if_the_clock_moves_further_forward() {
    let (service, clock) = service();
    let (_token, record) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
    clock.advance(Duration::hours(2));
    assert!(!service.validate(&record.id).valid);
    clock.advance(Duration::hours(24));
    let outcome = service.validate(&record.id);
    assert!(!outcome.valid);
    assert!(outcome.expired);
}

#[test]
fn unknown_token_id_reports_not_found_rather_than_any_other_failure_reason() {
    let (service, _clock) = service();
    let outcome = service.validate("does-not-exist");
    assert!(!outcome.valid);
    assert!(!outcome.revoked && !outcome.expired && !outcome.consumed && !outcome.not_yet_valid);
}

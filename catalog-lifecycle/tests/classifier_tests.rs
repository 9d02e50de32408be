use catalog_lifecycle::{
    Classification, ConflictClassifier, ConflictPolicy, HeuristicClassifier, ServiceResponse,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn classify(status: u16, body: Option<&str>) -> Classification {
    HeuristicClassifier::default().classify(&ServiceResponse::new(status, body.map(String::from)))
}

// ── Status rule ─────────────────────────────────────────────────

#[test]
fn conflict_statuses_without_body() {
    for status in [400, 409, 500] {
        assert!(classify(status, None).is_conflict(), "status {status}");
    }
}

#[test]
fn other_statuses_without_marker_are_unknown() {
    for status in [401, 403, 422, 502, 503] {
        assert_eq!(
            classify(status, Some(r#"{"message":"nope"}"#)),
            Classification::UnknownFailure {
                message: Some("nope".into())
            },
            "status {status}"
        );
    }
}

#[test]
fn strict_policy_drops_server_error_fallback() {
    let classifier = HeuristicClassifier::new(ConflictPolicy::strict());

    let verdict = classifier.classify(&ServiceResponse::with_body(500, "Erro interno"));

    assert_eq!(
        verdict,
        Classification::UnknownFailure {
            message: Some("Erro interno".into())
        }
    );
    assert!(
        classifier
            .classify(&ServiceResponse::empty(409))
            .is_conflict()
    );
}

// ── Marker rule ─────────────────────────────────────────────────

#[test]
fn marker_tokens_match_case_insensitively() {
    let bodies = [
        r#"{"message":"Category is LINKED to products"}"#,
        r#"{"title":"Has Product references"}"#,
        r#"{"detail":"Categoria vinculada"}"#,
        r#"{"error":"Existe PRODUTO associado"}"#,
        "linked records exist",
    ];
    for body in bodies {
        assert!(classify(422, Some(body)).is_conflict(), "body {body}");
    }
}

#[test]
fn conflict_keeps_extracted_message() {
    assert_eq!(
        classify(409, Some(r#"{"message":"produto vinculado"}"#)),
        Classification::Conflict {
            message: Some("produto vinculado".into())
        }
    );
    assert_eq!(classify(409, Some("produto vinculado")).message(), Some("produto vinculado"));
}

#[test]
fn custom_policy_from_config() {
    let policy = ConflictPolicy {
        conflict_statuses: vec![423],
        server_error_is_conflict: false,
        marker_tokens: vec!["in use".into()],
    };
    let classifier = HeuristicClassifier::new(policy);

    assert!(classifier.classify(&ServiceResponse::empty(423)).is_conflict());
    assert!(!classifier.classify(&ServiceResponse::empty(409)).is_conflict());
    assert!(
        classifier
            .classify(&ServiceResponse::with_body(418, "resource in use"))
            .is_conflict()
    );
}

#[test]
fn empty_marker_tokens_never_match() {
    let policy = ConflictPolicy {
        conflict_statuses: vec![],
        server_error_is_conflict: false,
        marker_tokens: vec![String::new()],
    };

    assert!(!policy.message_signals_conflict("anything"));
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn marker_in_message_is_conflict_for_any_status(
        status in 400u16..600,
        prefix in "[a-z ]{0,12}",
        suffix in "[a-z ]{0,12}",
        marker in prop::sample::select(vec!["linked", "product", "vinculad", "produto"]),
    ) {
        let body = serde_json::json!({ "message": format!("{prefix}{marker}{suffix}") }).to_string();
        prop_assert!(classify(status, Some(&body)).is_conflict());
    }

    #[test]
    fn conflict_status_is_conflict_for_any_body(
        status in prop::sample::select(vec![400u16, 409, 500]),
        body in proptest::option::of("[A-Za-z0-9 ]{0,40}"),
    ) {
        prop_assert!(classify(status, body.as_deref()).is_conflict());
    }

    #[test]
    fn unrelated_status_and_digits_only_body_is_unknown(
        status in 401u16..409,
        body in "[0-9]{1,20}",
    ) {
        prop_assert!(!classify(status, Some(&body)).is_conflict());
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::error::{AppError, ErrorCode};
    use crate::domain::session::{Session, SessionState};
    use crate::domain::settings::RewriterChoice;
    use crate::domain::types::{Dialect, OrderingPolicy, Tone};
    use crate::infra::rewriter::RewriteError;

    #[test]
    fn test_tone_serialization() {
        assert_eq!(serde_json::to_string(&Tone::Standard).unwrap(), "\"Standard\"");
        assert_eq!(serde_json::to_string(&Tone::Creative).unwrap(), "\"Creative\"");
        assert_eq!(
            serde_json::to_string(&Tone::Summarize).unwrap(),
            "\"Summarize\""
        );
    }

    #[test]
    fn test_tone_deserialization() {
        assert_eq!(
            serde_json::from_str::<Tone>("\"Formal\"").unwrap(),
            Tone::Formal
        );
        assert!(serde_json::from_str::<Tone>("\"formal\"").is_err());
    }

    #[test]
    fn test_dialect_serialization() {
        assert_eq!(serde_json::to_string(&Dialect::British).unwrap(), "\"British\"");
    }

    #[test]
    fn test_ordering_policy_serialization() {
        assert_eq!(
            serde_json::to_string(&OrderingPolicy::ArrivalOrder).unwrap(),
            "\"arrival_order\""
        );
        assert_eq!(
            serde_json::from_str::<OrderingPolicy>("\"issue_order\"").unwrap(),
            OrderingPolicy::IssueOrder
        );
        assert_eq!(
            serde_json::from_str::<RewriterChoice>("\"noop\"").unwrap(),
            RewriterChoice::Noop
        );
        for policy in [OrderingPolicy::ArrivalOrder, OrderingPolicy::IssueOrder] {
            assert_eq!(
                serde_json::to_string(&policy).unwrap(),
                format!("\"{}\"", policy.as_str())
            );
        }
    }

    #[test]
    fn test_session_state_serialization() {
        assert_eq!(
            serde_json::to_string(&SessionState::Idle).unwrap(),
            "\"idle\""
        );
        assert_eq!(
            serde_json::to_string(&SessionState::Requesting).unwrap(),
            "\"requesting\""
        );
        for state in [SessionState::Idle, SessionState::Requesting] {
            assert_eq!(
                serde_json::to_string(&state).unwrap(),
                format!("\"{}\"", state.as_str())
            );
        }
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut session = Session::new(
            "s1".to_string(),
            Tone::Simple,
            "2025-01-15T10:30:00Z".to_string(),
        );
        session.set_text("quick note");
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["tone"], "Simple");
        assert_eq!(json["dialect"], "British");
        assert_eq!(json["text"], "quick note");
        assert_eq!(json["busy"], false);
    }

    #[test]
    fn test_error_code_serialization() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::Network).unwrap(),
            "\"E_NETWORK\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::MalformedResponse).unwrap(),
            "\"E_MALFORMED_RESPONSE\""
        );
    }

    #[test]
    fn test_app_error_serialization() {
        let err = AppError::clipboard("denied");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("E_CLIPBOARD"));
        assert!(json.contains("recoverable"));
    }

    #[test]
    fn test_rewrite_error_to_app_error() {
        let err: AppError = RewriteError::MalformedResponse("missing field".to_string()).into();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "E_MALFORMED_RESPONSE");
        assert_eq!(json["recoverable"], true);

        let err: AppError = RewriteError::Status {
            status: 503,
            body: String::new(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Network);
    }
}

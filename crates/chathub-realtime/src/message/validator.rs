//! Inbound frame checks.

use chathub_core::error::AppError;

use super::types::InboundEvent;

/// Rejects frames that are empty or larger than `max_bytes`.
pub fn validate_frame(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {max_bytes} bytes"
        )));
    }
    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty frame"));
    }
    Ok(())
}

/// Validates and decodes one inbound frame.
pub fn decode(raw: &str, max_bytes: usize) -> Result<InboundEvent, AppError> {
    validate_frame(raw, max_bytes)?;
    serde_json::from_str(raw).map_err(|e| AppError::validation(format!("Malformed event: {e}")))
}

#[cfg(test)]
mod tests {
    use chathub_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert_eq!(
            validate_frame("   ", 64).unwrap_err().kind,
            ErrorKind::Validation
        );
        let big = "x".repeat(65);
        assert!(validate_frame(&big, 64).is_err());
        assert!(validate_frame("{}", 64).is_ok());
    }

    #[test]
    fn test_unknown_event_is_validation_error() {
        let err = decode(r#"{"event":"subscribe","data":"x"}"#, 1024).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.starts_with("Malformed event"));
    }

    #[test]
    fn test_decodes_leave() {
        let event = decode(r#"{"event":"leaveConversation","data":"c1"}"#, 1024).unwrap();
        assert_eq!(event, InboundEvent::LeaveConversation("c1".into()));
    }
}

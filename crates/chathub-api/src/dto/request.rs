//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

use chathub_core::error::AppError;
use chathub_entity::user::UpdateUser;

/// Runs `validator` rules and reports a failing rule's message as a validation error.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate().map_err(|errors| {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request body".to_string());
        AppError::validation(message)
    })
}

/// `POST /api/users/register`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `POST /api/users/login`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `PUT /api/users/update`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
}

impl From<UpdateProfileRequest> for UpdateUser {
    fn from(req: UpdateProfileRequest) -> Self {
        UpdateUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
        }
    }
}

/// `POST /api/chatrooms`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 200, message = "Chat room name is required"))]
    pub name: String,
}

/// `POST /api/conversations`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    #[validate(length(min = 1, message = "Other user is required"))]
    pub other_user_id: String,
}

/// `POST /api/conversations/{id}/messages`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "Message content is required"))]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_failure_message_is_reported() {
        let req = CreateRoomRequest {
            name: String::new(),
        };
        let err = validate_body(&req).unwrap_err();
        assert_eq!(err.message, "Chat room name is required");
    }

    #[test]
    fn test_optional_email_is_checked_only_when_present() {
        assert!(validate_body(&UpdateProfileRequest::default()).is_ok());
        let bad = UpdateProfileRequest {
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(validate_body(&bad).is_err());
    }

    #[test]
    fn test_register_uses_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","password":"secret1"}"#,
        )
        .unwrap();
        assert!(validate_body(&req).is_ok());
        assert_eq!(req.first_name, "Ada");
    }
}

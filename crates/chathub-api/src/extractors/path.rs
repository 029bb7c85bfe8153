//! Typed path parameter helpers.

use std::str::FromStr;

use chathub_core::error::AppError;

/// Parses a typed ID from a path segment.
pub fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid {what} id: {raw}")))
}

#[cfg(test)]
mod tests {
    use chathub_core::types::RoomId;

    use super::*;

    #[test]
    fn test_parse_id() {
        let id = RoomId::new();
        assert_eq!(parse_id::<RoomId>(&id.to_string(), "chat room").unwrap(), id);
        let err = parse_id::<RoomId>("lobby", "chat room").unwrap_err();
        assert_eq!(err.message, "Invalid chat room id: lobby");
    }
}

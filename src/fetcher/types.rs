//! Upstream wire types
//!
//! Shapes returned by the upstream `/messages/` endpoint:
//! `{ "total": 3349, "items": [{ "id", "user_id", "user_name", "timestamp", "message" }] }`

use serde::{Deserialize, Serialize};

/// A single message as published by the upstream source.
///
/// Every field is required and non-null; a body missing any of them fails
/// to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier
    pub id: String,
    /// Author identifier
    pub user_id: String,
    /// Author display name
    pub user_name: String,
    /// Opaque timestamp string, never parsed
    pub timestamp: String,
    /// Body text
    pub message: String,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        timestamp: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            timestamp: timestamp.into(),
            message: message.into(),
        }
    }
}

/// One page of the upstream listing.
///
/// `total` is whatever the upstream states; it is not checked against
/// `items.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesPage {
    pub total: u64,
    pub items: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_page() {
        let body = r#"{
            "total": 2,
            "items": [
                {"id": "1", "user_id": "u1", "user_name": "Alice", "timestamp": "2024-01-01T00:00:00Z", "message": "Hello"},
                {"id": "2", "user_id": "u2", "user_name": "Bob", "timestamp": "2024-01-02T00:00:00Z", "message": "Bye"}
            ]
        }"#;

        let page: MessagesPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].user_name, "Alice");
        assert_eq!(page.items[1].message, "Bye");
    }

    #[test]
    fn test_missing_field_rejected() {
        let body = r#"{"total": 1, "items": [{"id": "1", "user_id": "u1", "timestamp": "t", "message": "m"}]}"#;
        assert!(serde_json::from_str::<MessagesPage>(body).is_err());
    }

    #[test]
    fn test_null_field_rejected() {
        let body = r#"{"total": 1, "items": [{"id": "1", "user_id": "u1", "user_name": null, "timestamp": "t", "message": "m"}]}"#;
        assert!(serde_json::from_str::<MessagesPage>(body).is_err());
    }
}

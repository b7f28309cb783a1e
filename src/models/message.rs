use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub text: String,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self { id: 0, text: text.into() }
    }

    pub fn with_id(id: i64, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }

    /// Zero or negative ids are left for the store to assign.
    pub fn has_assigned_id(&self) -> bool {
        self.id > 0
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct PalindromeCheck {
    #[serde(rename = "Message")]
    pub message: Message,
    #[serde(rename = "Palindrome")]
    pub palindrome: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let m: Message = serde_json::from_str(r#"{"text":"level"}"#).unwrap();
        assert_eq!(m, Message::new("level"));
        assert!(!m.has_assigned_id());

        let m: Message = serde_json::from_str("{}").unwrap();
        assert_eq!(m, Message::default());
    }

    #[test]
    fn palindrome_check_uses_capitalised_keys() {
        let body = serde_json::to_value(PalindromeCheck {
            message: Message::with_id(3, "aba"),
            palindrome: true,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "Message": { "id": 3, "text": "aba" }, "Palindrome": true })
        );
    }
}

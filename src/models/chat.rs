use serde::{ Serialize, Deserialize };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One entry of a conversation, in the wire shape the provider understands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    parts: Vec<Part>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect()
    }
}

/// Body of `POST /chat`. `history` holds every turn before `message`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub history: Vec<Turn>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_turn_serializes_to_wire_shape() {
        let value = serde_json::to_value(Turn::user("Hi")).unwrap();
        assert_eq!(value, json!({ "role": "user", "parts": [{ "text": "Hi" }] }));
    }

    #[test]
    fn model_role_is_lowercase() {
        let turn: Turn = serde_json::from_value(
            json!({ "role": "model", "parts": [{ "text": "Hello" }] })
        ).unwrap();
        assert_eq!(turn, Turn::model("Hello"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = serde_json::from_value::<Turn>(
            json!({ "role": "assistant", "parts": [{ "text": "Hello" }] })
        );
        assert!(result.is_err());
    }

    #[test]
    fn text_joins_all_parts() {
        let turn = Turn {
            role: Role::Model,
            parts: vec![Part { text: "Hel".into() }, Part { text: "lo".into() }],
        };
        assert_eq!(turn.text(), "Hello");
    }

    #[test]
    fn decoded_turn_exposes_role_and_parts() {
        let turn: Turn = serde_json::from_value(
            json!({ "role": "user", "parts": [{ "text": "a" }, { "text": "b" }] })
        ).unwrap();
        assert_eq!(turn.role(), Role::User);
        assert_eq!(turn.parts(), &[Part { text: "a".into() }, Part { text: "b".into() }]);
    }

    #[test]
    fn request_without_history_defaults_to_empty() {
        let request: ChatRequest = serde_json::from_value(json!({ "message": "Hi" })).unwrap();
        assert!(request.history.is_empty());
        assert_eq!(request.message, "Hi");
    }

    #[test]
    fn request_without_message_is_rejected() {
        let result = serde_json::from_value::<ChatRequest>(json!({ "history": [] }));
        assert!(result.is_err());
    }
}

use serde::Serialize;
use serde_json::Value;

pub const INCOMPATIBLE_FILTER_MESSAGE: &str = "No results / incompatible filter combination.";

/// One catalog entry, kept exactly as the API returned it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GameRecord(Value);

impl GameRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The id rendered as a string, whether the API sent a number or a string.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    pub fn short_description(&self) -> Option<&str> {
        self.str_field("short_description")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    pub fn genre(&self) -> Option<&str> {
        self.str_field("genre")
    }

    pub fn platform(&self) -> Option<&str> {
        self.str_field("platform")
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.str_field("thumbnail")
    }

    pub fn game_url(&self) -> Option<&str> {
        self.str_field("game_url")
    }

    pub fn publisher(&self) -> Option<&str> {
        self.str_field("publisher")
    }

    pub fn developer(&self) -> Option<&str> {
        self.str_field("developer")
    }

    pub fn release_date(&self) -> Option<&str> {
        self.str_field("release_date")
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedOutcome {
    GameList(Vec<GameRecord>),
    NoResult(String),
}

pub fn normalize(payload: Value) -> NormalizedOutcome {
    match payload {
        Value::Array(items) => {
            NormalizedOutcome::GameList(items.into_iter().map(GameRecord::new).collect())
        }
        other => NormalizedOutcome::NoResult(extract_message(&other)),
    }
}

/// Best-effort human message from an error-shaped payload. Empty when the
/// payload carries nothing usable.
pub fn extract_message(payload: &Value) -> String {
    let Value::Object(obj) = payload else {
        return String::new();
    };

    for key in ["message", "error"] {
        match obj.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            _ => {}
        }
    }

    match obj.get("status") {
        None | Some(Value::Null) => String::new(),
        Some(status) if is_success_status(status) => String::new(),
        Some(_) => INCOMPATIBLE_FILTER_MESSAGE.to_string(),
    }
}

fn is_success_status(status: &Value) -> bool {
    match status {
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s == "success",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn arrays_become_game_lists_unchanged() {
        let payload = json!([
            {"id": 3, "title": "Zeta"},
            {"id": 1, "title": "Alpha"},
            "not even an object"
        ]);
        let NormalizedOutcome::GameList(items) = normalize(payload.clone()) else {
            panic!("expected a game list");
        };
        assert_eq!(serde_json::to_value(&items).unwrap(), payload);
    }

    #[test]
    fn empty_array_is_still_a_list() {
        assert_eq!(normalize(json!([])), NormalizedOutcome::GameList(vec![]));
    }

    #[test]
    fn message_wins_over_other_fields() {
        let payload = json!({"status": 0, "error": "ignored", "message": "X"});
        assert_eq!(extract_message(&payload), "X");
    }

    #[test]
    fn error_field_used_when_message_missing_or_not_a_string() {
        assert_eq!(extract_message(&json!({"error": "Bad tag"})), "Bad tag");
        assert_eq!(
            extract_message(&json!({"message": 42, "error": "Bad tag"})),
            "Bad tag"
        );
    }

    #[test]
    fn failing_status_without_message_gets_fallback() {
        for status in [json!(0), json!(2), json!("error"), json!(false)] {
            assert_eq!(
                extract_message(&json!({ "status": status })),
                INCOMPATIBLE_FILTER_MESSAGE
            );
        }
    }

    #[test]
    fn success_sentinels_never_trigger_fallback() {
        assert_eq!(extract_message(&json!({"status": "success"})), "");
        assert_eq!(extract_message(&json!({"status": 1})), "");
        assert_eq!(extract_message(&json!({"status": null})), "");
        assert_eq!(extract_message(&json!({})), "");
    }

    #[test]
    fn strings_and_scalars_carry_no_message() {
        assert_eq!(extract_message(&json!("<html>oops</html>")), "");
        assert_eq!(extract_message(&Value::Null), "");
        assert_eq!(
            normalize(json!("Forbidden")),
            NormalizedOutcome::NoResult(String::new())
        );
    }

    #[test]
    fn record_accessors_are_lenient() {
        let game = GameRecord::new(json!({
            "id": 540,
            "title": "Overwatch 2",
            "genre": "",
            "platform": "PC (Windows)"
        }));
        assert_eq!(game.id().as_deref(), Some("540"));
        assert_eq!(game.title(), Some("Overwatch 2"));
        assert_eq!(game.genre(), None);
        assert_eq!(game.publisher(), None);

        let string_id = GameRecord::new(json!({"id": "12"}));
        assert_eq!(string_id.id().as_deref(), Some("12"));
    }
}

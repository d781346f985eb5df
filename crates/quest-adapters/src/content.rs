//! Helpers para armar el `content` JSON que consumen los widgets.
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Clave bajo la que el host envía la opción elegida.
pub const CHOICE_KEY: &str = "choice";
/// Clave del valor numérico de un slider.
pub const VALUE_KEY: &str = "value";
/// Clave de puntaje que el servidor suma en `derivedScore`.
pub const SCORE_KEY: &str = "score";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: &str, label: &str) -> Self {
        Self { id: id.to_string(),
               label: label.to_string() }
    }
}

pub fn text(body: &str) -> Value {
    json!({ "text": body })
}

pub fn choices(prompt: &str, options: &[Choice]) -> Value {
    json!({ "text": prompt, "answerKey": CHOICE_KEY, "choices": options })
}

pub fn slider(prompt: &str, min: i64, max: i64) -> Value {
    json!({ "text": prompt, "answerKey": VALUE_KEY, "min": min, "max": max })
}

/// Opción elegida en una fase anterior, si la hubo.
pub fn chosen(answers: Option<&Value>) -> Option<&str> {
    answers?.get(CHOICE_KEY)?.as_str()
}

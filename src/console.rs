//! Superficie de chat de terminal para la demo `main-core`.
//!
//! Pinta cada mensaje como texto plano y recuerda el último mensaje con
//! continuación viva: es el que responde la siguiente línea de stdin.
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use log::debug;
use quest_core::{ChatMessage, ChatSurface, ContinuationAction, MessageId, MessageKind, StepInput};
use serde_json::{json, Value};

/// Palabra que dispara la salida anticipada en fases que la admiten.
pub const STOP_WORD: &str = "stop";

pub struct ConsoleSurface {
    out: Mutex<Box<dyn Write + Send>>,
    pending: Mutex<Option<ChatMessage>>,
}

impl ConsoleSurface {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out: Mutex::new(out),
               pending: Mutex::new(None) }
    }

    /// Mensaje que espera respuesta, si lo hay.
    pub fn pending(&self) -> Option<ChatMessage> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            debug!("console:write_failed error={e}");
        }
    }
}

impl ChatSurface for ConsoleSurface {
    fn add_message(&self, message: ChatMessage) {
        self.write_line(&render(&message));
        if message.continuation().action() != ContinuationAction::Disabled {
            *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(message);
        }
    }

    fn remove_message(&self, id: MessageId) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.as_ref().is_some_and(|m| m.id == id) {
            *pending = None;
        }
    }
}

/// Representación de texto de un mensaje.
pub fn render(message: &ChatMessage) -> String {
    if message.kind == MessageKind::Typing {
        return "  ...".to_string();
    }
    let content = &message.payload.content;
    let mut lines = vec![format!("[{}] {}", message.phase(), content["text"].as_str().unwrap_or_default())];
    if let Some(choices) = content["choices"].as_array() {
        for (i, choice) in choices.iter().enumerate() {
            lines.push(format!("    {}) {}", i + 1, choice["label"].as_str().unwrap_or_default()));
        }
    }
    if let (Some(min), Some(max)) = (content["min"].as_i64(), content["max"].as_i64()) {
        lines.push(format!("    (a number from {min} to {max})"));
    }
    for key in ["surveyUrl", "supportUrl"] {
        if let Some(url) = content[key].as_str() {
            lines.push(format!("    {url}"));
        }
    }
    if content["supportsEarlyStop"].as_bool() == Some(true) {
        lines.push(format!("    (type '{STOP_WORD}' to finish early)"));
    }
    lines.join("\n")
}

/// Traduce una línea de stdin a la entrada del paso.
///
/// Las opciones se pueden elegir por número; los sliders aceptan números.
pub fn parse_answer(line: &str, message: &ChatMessage) -> StepInput {
    let line = line.trim();
    let content = &message.payload.content;
    if line.eq_ignore_ascii_case(STOP_WORD) && content["supportsEarlyStop"].as_bool() == Some(true) {
        return StepInput::stop_early("user requested");
    }
    let Some(key) = content["answerKey"].as_str() else {
        return StepInput::empty();
    };
    if line.is_empty() {
        return StepInput::empty();
    }
    let value = match (content["choices"].as_array(), line.parse::<usize>()) {
        (Some(choices), Ok(n)) if (1..=choices.len()).contains(&n) => choices[n - 1]["id"].clone(),
        _ => match line.parse::<f64>() {
            Ok(number) => json!(number),
            Err(_) => Value::String(line.to_string()),
        },
    };
    let mut answers = serde_json::Map::new();
    answers.insert(key.to_string(), value);
    StepInput::empty().with_answers(Value::Object(answers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_core::{Continuation, Phase, Renderer};

    fn message(phase: Phase, content: Value) -> ChatMessage {
        ChatMessage::assistant(phase, MessageKind::Question, Renderer::ChoiceList, content, Continuation::disabled())
    }

    #[test]
    fn numbered_choice_maps_to_its_id() {
        let m = message(Phase::Disclosure,
                        json!({ "text": "ok?", "answerKey": "choice",
                                "choices": [{ "id": "agree", "label": "Yes" }, { "id": "decline", "label": "No" }] }));
        assert_eq!(parse_answer("2", &m).answers, Some(json!({ "choice": "decline" })));
        assert_eq!(parse_answer("decline", &m).answers, Some(json!({ "choice": "decline" })));
        assert!(render(&m).contains("2) No"));
    }

    #[test]
    fn stop_only_counts_where_supported() {
        let puzzle = message(Phase::SkillPuzzle, json!({ "text": "go", "supportsEarlyStop": true }));
        assert!(parse_answer(" STOP ", &puzzle).is_early_stop());

        let slider = message(Phase::CompensationOffer, json!({ "text": "how much", "answerKey": "value" }));
        assert!(!parse_answer("stop", &slider).is_early_stop());
        assert_eq!(parse_answer("7", &slider).answers, Some(json!({ "value": 7.0 })));
    }

    #[test]
    fn disabled_messages_are_never_pending() {
        let surface = ConsoleSurface::new(Box::new(std::io::sink()));
        surface.add_message(message(Phase::Initial, json!({ "text": "hi" })));
        assert!(surface.pending().is_none());
    }
}

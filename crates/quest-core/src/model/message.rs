//! Mensajes de chat efímeros.
//!
//! Un `ChatMessage` nunca se persiste: existe sólo en la superficie de chat
//! durante una ejecución del orquestador, y a lo sumo uno (no transitorio)
//! por fase y ejecución.
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::Phase;
use crate::engine::Continuation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Question,
    /// Indicador de "escribiendo..."; transitorio, no cuenta como mensaje de
    /// la fase y no se reproduce en replay.
    Typing,
    Completion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    Assistant,
    User,
    System,
}

/// Clave del widget con el que la superficie debe pintar el mensaje.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Renderer {
    Bubble,
    TypingIndicator,
    ChoiceList,
    Slider,
    Puzzle,
    LinkCard,
}

/// Contenido de un mensaje más su continuación (`onStepComplete`).
#[derive(Debug, Clone)]
pub struct MessagePayload {
    pub phase: Phase,
    pub content: Value,
    pub on_step_complete: Continuation,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: MessageId,
    pub kind: MessageKind,
    pub sender: Sender,
    pub payload: MessagePayload,
    pub renderer: Renderer,
}

impl ChatMessage {
    pub fn new(kind: MessageKind,
               sender: Sender,
               renderer: Renderer,
               phase: Phase,
               content: Value,
               continuation: Continuation)
               -> Self {
        Self { id: MessageId::new(),
               kind,
               sender,
               payload: MessagePayload { phase,
                                         content,
                                         on_step_complete: continuation },
               renderer }
    }

    /// Mensaje del asistente (el caso habitual de las factories).
    pub fn assistant(phase: Phase,
                     kind: MessageKind,
                     renderer: Renderer,
                     content: Value,
                     continuation: Continuation)
                     -> Self {
        Self::new(kind, Sender::Assistant, renderer, phase, content, continuation)
    }

    pub fn typing(phase: Phase) -> Self {
        Self::new(MessageKind::Typing,
                  Sender::Assistant,
                  Renderer::TypingIndicator,
                  phase,
                  Value::Null,
                  Continuation::disabled())
    }

    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, MessageKind::Typing)
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.payload.phase
    }

    #[inline]
    pub fn continuation(&self) -> &Continuation {
        &self.payload.on_step_complete
    }
}

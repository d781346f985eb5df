use quest_core::{phase_factory, ChatMessage, MessageKind, Phase, Renderer};

use crate::content::{choices, text, Choice};

phase_factory! {
    IntroFactory {
        phase: Phase::Initial,
        build(_state, cont) {
            ChatMessage::assistant(Phase::Initial,
                                   MessageKind::Question,
                                   Renderer::ChoiceList,
                                   choices("Hi! This short chat takes about ten minutes. Ready to begin?",
                                           &[Choice::new("start", "Let's start")]),
                                   cont)
        }
    }
}

phase_factory! {
    BriefingFactory {
        phase: Phase::Briefing,
        build(_state, cont) {
            ChatMessage::assistant(Phase::Briefing,
                                   MessageKind::Text,
                                   Renderer::Bubble,
                                   text("We'll ask about your job search, then show you a short skill puzzle."),
                                   cont)
        }
    }
}

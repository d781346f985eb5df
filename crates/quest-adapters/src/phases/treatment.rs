//! Fases de tratamiento: sólo aparecen en las topologías que las incluyen.
use quest_core::{phase_factory, ChatMessage, FlowCopy, MessageKind, Phase, Renderer};
use serde_json::json;

use crate::content::{chosen, choices, slider, Choice};

phase_factory! {
    DisclosureFactory {
        phase: Phase::Disclosure,
        build(_state, cont) {
            ChatMessage::assistant(Phase::Disclosure,
                                   MessageKind::Question,
                                   Renderer::ChoiceList,
                                   choices("Your answers help employers understand what candidates can do. OK to share an anonymised summary?",
                                           &[Choice::new("agree", "Yes, share it"),
                                             Choice::new("decline", "Keep it private")]),
                                   cont)
        }
    }
}

phase_factory! {
    ProofOfValueFactory {
        phase: Phase::ProofOfValue,
        build(state, cont) {
            let shared = chosen(state.response_for(Phase::Disclosure)) == Some("agree");
            ChatMessage::assistant(Phase::ProofOfValue,
                                   MessageKind::Text,
                                   Renderer::Bubble,
                                   json!({
                                       "text": "Candidates who completed the puzzle heard back from recruiters twice as often.",
                                       "personalised": shared,
                                   }),
                                   cont)
        }
    }
}

phase_factory! {
    CompensationOfferFactory {
        phase: Phase::CompensationOffer,
        fields { copy: FlowCopy },
        build(me, _state, cont) {
            ChatMessage::assistant(Phase::CompensationOffer,
                                   MessageKind::Question,
                                   Renderer::Slider,
                                   slider(&me.copy.compensation_text, 0, 10),
                                   cont)
        }
    }
}

use quest_core::{phase_factory, ChatMessage, FlowCopy, MessageKind, Phase, Renderer, Sender};
use serde_json::json;

phase_factory! {
    DebriefFactory {
        phase: Phase::Debrief,
        build(state, cont) {
            let stopped_early = state.metrics_for(Phase::SkillPuzzle)
                                     .and_then(|m| m.get(quest_core::constants::STOPPED_EARLY_KEY))
                                     .and_then(|v| v.as_bool())
                                     .unwrap_or(false);
            vec![ChatMessage::typing(Phase::Debrief),
                 ChatMessage::assistant(Phase::Debrief,
                                        MessageKind::Text,
                                        Renderer::Bubble,
                                        json!({
                                            "text": "Thanks! Here is how you did.",
                                            "score": state.derived_score,
                                            "stoppedEarly": stopped_early,
                                        }),
                                        cont)]
        }
    }
}

phase_factory! {
    CompletionFactory {
        phase: Phase::Completed,
        fields { copy: FlowCopy },
        build(me, _state, cont) {
            ChatMessage::new(MessageKind::Completion,
                             Sender::System,
                             Renderer::LinkCard,
                             Phase::Completed,
                             json!({
                                 "text": "All done. One last thing: tell us how it went.",
                                 "surveyUrl": me.copy.survey_url,
                                 "supportUrl": me.copy.support_url,
                             }),
                             cont)
        }
    }
}

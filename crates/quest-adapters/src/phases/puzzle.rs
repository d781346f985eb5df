use quest_core::{phase_factory, ChatMessage, MessageKind, Phase, Renderer};
use serde_json::json;

/// Segundos que el widget deja jugar antes de ofrecer el cierre.
pub const PUZZLE_TIME_LIMIT_SECS: u64 = 180;

phase_factory! {
    SkillPuzzleFactory {
        phase: Phase::SkillPuzzle,
        build(_state, cont) {
            // El widget puede cortar antes; envía StepInput::stop_early y el flujo sigue.
            vec![ChatMessage::typing(Phase::SkillPuzzle),
                 ChatMessage::assistant(Phase::SkillPuzzle,
                                        MessageKind::Question,
                                        Renderer::Puzzle,
                                        json!({
                                            "text": "Solve as many pattern rounds as you can.",
                                            "puzzleId": "pattern-v1",
                                            "timeLimitSecs": PUZZLE_TIME_LIMIT_SECS,
                                            "supportsEarlyStop": true,
                                        }),
                                        cont)]
        }
    }
}

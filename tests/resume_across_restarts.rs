//! Un flujo se reanuda desde el backend de archivos con un orquestador nuevo,
//! como tras recargar la página.
use std::sync::{Arc, Mutex};

use quest_adapters::standard_factories;
use quest_core::{ChatMessage, ChatSurface, ExperimentGroup, FlowCopy, FlowOrchestrator, FlowProgress,
                 GroupAssignment, InstantScheduler, MessageId, Phase, PresentationConfig, StateGateway, StepInput};
use quest_persistence::FileStateGateway;
use serde_json::json;

#[derive(Default)]
struct Recorder {
    messages: Mutex<Vec<ChatMessage>>,
}

impl Recorder {
    fn visible(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl ChatSurface for Recorder {
    fn add_message(&self, message: ChatMessage) {
        self.messages.lock().unwrap().push(message);
    }

    fn remove_message(&self, id: MessageId) {
        self.messages.lock().unwrap().retain(|m| m.id != id);
    }
}

fn orchestrator(dir: &std::path::Path, surface: Arc<Recorder>) -> FlowOrchestrator {
    let gateway = FileStateGateway::new(dir).with_assignment(GroupAssignment::Pinned(ExperimentGroup::DisclosureOnly));
    FlowOrchestrator::builder(Arc::new(gateway), surface).factories(standard_factories(&FlowCopy::default()))
                                                        .session("reload-1")
                                                        .presentation(PresentationConfig::instant())
                                                        .scheduler(Arc::new(InstantScheduler::new()))
                                                        .build()
                                                        .unwrap()
}

#[tokio::test]
async fn second_orchestrator_replays_what_the_first_confirmed() {
    let dir = tempfile::tempdir().unwrap();

    let first_surface = Arc::new(Recorder::default());
    let first = orchestrator(dir.path(), first_surface.clone());
    assert_eq!(first.start().await, FlowProgress::AwaitingInput { phase: Phase::Initial });
    let step = first_surface.visible().last().unwrap().continuation().clone();
    assert_eq!(step.invoke(StepInput::empty().with_answers(json!({ "choice": "start" }))).await,
               FlowProgress::AwaitingInput { phase: Phase::Briefing });
    let step = first_surface.visible().last().unwrap().continuation().clone();
    assert_eq!(step.acknowledge().await, FlowProgress::AwaitingInput { phase: Phase::Disclosure });
    first.cleanup();
    drop(first);

    let second_surface = Arc::new(Recorder::default());
    let second = orchestrator(dir.path(), second_surface.clone());
    assert_eq!(second.start().await, FlowProgress::AwaitingInput { phase: Phase::Disclosure });

    let visible = second_surface.visible();
    let phases: Vec<Phase> = visible.iter().map(|m| m.phase()).collect();
    assert_eq!(phases, vec![Phase::Initial, Phase::Briefing, Phase::Disclosure]);
    let live: Vec<Phase> = visible.iter()
                                  .filter(|m| m.continuation().is_enabled())
                                  .map(|m| m.phase())
                                  .collect();
    assert_eq!(live, vec![Phase::Disclosure]);

    let stored = FileStateGateway::new(dir.path()).fetch("reload-1").await.unwrap().unwrap();
    assert_eq!(stored.experiment_group, ExperimentGroup::DisclosureOnly);
    assert_eq!(stored.response_for(Phase::Initial), Some(&json!({ "choice": "start" })));
}

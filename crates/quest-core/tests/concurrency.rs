//! Avances concurrentes y teardown a mitad de una pausa de presentación.
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Harness, RecordingSurface, ScriptedGateway};
use quest_core::engine::TokioScheduler;
use quest_core::{ExperimentGroup, FlowCopy, FlowOrchestrator, FlowProgress, Phase, PresentationConfig, StepInput};
use tokio::sync::Semaphore;

async fn wait_for_updates(gateway: &ScriptedGateway, calls: usize) {
    while gateway.update_calls() < calls {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn second_invocation_while_in_flight_is_busy() {
    let gate = Arc::new(Semaphore::new(0));
    let h = Harness::new(ScriptedGateway::pinned(ExperimentGroup::Control).gated(gate.clone()), "busy");
    h.orchestrator.start().await;
    let cont = h.surface.last().continuation().clone();

    let pending = {
        let cont = cont.clone();
        tokio::spawn(async move { cont.invoke(StepInput::empty()).await })
    };
    wait_for_updates(&h.gateway, 1).await;

    assert!(!cont.is_enabled());
    assert_eq!(cont.invoke(StepInput::empty()).await, FlowProgress::Busy);
    assert!(h.orchestrator.snapshot().in_flight);

    gate.add_permits(1);
    assert_eq!(pending.await.unwrap(), FlowProgress::AwaitingInput { phase: Phase::Briefing });
    assert_eq!(h.gateway.update_calls(), 1);
    assert_eq!(h.surface.visible_phases(), vec![Phase::Initial, Phase::Briefing]);
}

#[tokio::test]
async fn cleanup_cancels_pending_presentation() {
    let gateway = Arc::new(ScriptedGateway::pinned(ExperimentGroup::Control));
    let surface = Arc::new(RecordingSurface::default());
    let orchestrator = FlowOrchestrator::builder(gateway.clone(), surface.clone()).factories(quest_adapters::standard_factories(&FlowCopy::default()))
                                                                                  .session("teardown")
                                                                                  .scheduler(Arc::new(TokioScheduler::new()))
                                                                                  .presentation(PresentationConfig { message_delay_ms: 60_000,
                                                                                                                     ..PresentationConfig::default() })
                                                                                  .build()
                                                                                  .unwrap();
    assert_eq!(orchestrator.start().await, FlowProgress::AwaitingInput { phase: Phase::Initial });
    let cont = surface.last().continuation().clone();

    let pending = tokio::spawn(async move { cont.acknowledge().await });
    wait_for_updates(&gateway, 1).await;
    orchestrator.cleanup();

    let outcome = tokio::time::timeout(Duration::from_secs(5), pending).await
                                                                      .expect("cancelled promptly")
                                                                      .unwrap();
    assert_eq!(outcome, FlowProgress::Cancelled);
    assert_eq!(surface.visible_phases(), vec![Phase::Initial]);
    assert_eq!(orchestrator.start().await, FlowProgress::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn typing_indicator_is_removed_before_the_real_message() {
    let gateway = Arc::new(ScriptedGateway::pinned(ExperimentGroup::Control));
    gateway.inner.seed(common::persisted("typing", ExperimentGroup::Control, &[Phase::Initial, Phase::Briefing]));
    let surface = Arc::new(RecordingSurface::default());
    let orchestrator = FlowOrchestrator::builder(gateway.clone(), surface.clone()).factories(quest_adapters::standard_factories(&FlowCopy::default()))
                                                                                  .session("typing")
                                                                                  .scheduler(Arc::new(TokioScheduler::new()))
                                                                                  .build()
                                                                                  .unwrap();
    orchestrator.start().await;

    let progress = surface.last().continuation().acknowledge().await;

    assert_eq!(progress, FlowProgress::AwaitingInput { phase: Phase::SkillPuzzle });
    assert_eq!(surface.removed().len(), 1);
    assert!(surface.visible().iter().all(|m| !m.is_transient()));
    assert_eq!(surface.visible_phases(), vec![Phase::Initial, Phase::Briefing, Phase::SkillPuzzle]);
}

#[tokio::test]
async fn cleanup_during_typing_removes_the_indicator() {
    let gateway = Arc::new(ScriptedGateway::pinned(ExperimentGroup::Control));
    gateway.inner.seed(common::persisted("typing-teardown", ExperimentGroup::Control, &[Phase::Initial, Phase::Briefing]));
    let surface = Arc::new(RecordingSurface::default());
    let orchestrator = FlowOrchestrator::builder(gateway.clone(), surface.clone()).factories(quest_adapters::standard_factories(&FlowCopy::default()))
                                                                                  .session("typing-teardown")
                                                                                  .scheduler(Arc::new(TokioScheduler::new()))
                                                                                  .presentation(PresentationConfig { typing_delay_ms: 60_000,
                                                                                                                     ..PresentationConfig::default() })
                                                                                  .build()
                                                                                  .unwrap();
    orchestrator.start().await;
    let cont = surface.last().continuation().clone();

    let pending = tokio::spawn(async move { cont.acknowledge().await });
    while !surface.visible().iter().any(|m| m.is_transient()) {
        tokio::task::yield_now().await;
    }
    orchestrator.cleanup();

    let outcome = tokio::time::timeout(Duration::from_secs(5), pending).await
                                                                      .expect("cancelled promptly")
                                                                      .unwrap();
    assert_eq!(outcome, FlowProgress::Cancelled);
    assert_eq!(surface.removed().len(), 1);
    assert!(surface.visible().iter().all(|m| !m.is_transient()));
    assert_eq!(surface.visible_phases(), vec![Phase::Initial, Phase::Briefing]);
}

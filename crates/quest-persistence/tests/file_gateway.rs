use quest_core::{ExperimentGroup, GatewayError, GroupAssignment, Phase, StateGateway, StepInput, UpdateRequest};
use quest_persistence::FileStateGateway;
use serde_json::json;

fn gateway(dir: &tempfile::TempDir) -> FileStateGateway {
    FileStateGateway::new(dir.path()).with_assignment(GroupAssignment::Pinned(ExperimentGroup::Control))
}

#[tokio::test]
async fn absent_session_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(gateway(&dir).fetch("nobody").await.unwrap(), None);
}

#[tokio::test]
async fn initialize_is_idempotent_and_survives_a_new_instance() {
    let dir = tempfile::tempdir().unwrap();
    let first = gateway(&dir).initialize("s-1").await.unwrap();
    assert_eq!(first.current_phase(), Some(Phase::Initial));

    let again = gateway(&dir).initialize("s-1").await.unwrap();
    assert_eq!(again, first);

    let raw = std::fs::read_to_string(dir.path().join("s-1.json")).unwrap();
    assert!(raw.contains("\"experimentGroup\": \"control\""));
    assert!(raw.contains("\"phaseHistory\""));
}

#[tokio::test]
async fn update_appends_and_merges_answers() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway(&dir);
    gw.initialize("s-2").await.unwrap();

    let input = StepInput::empty().with_answers(json!({ "choice": "start" }));
    let next = gw.update("s-2", UpdateRequest::new(Phase::Briefing, input)).await.unwrap();

    assert_eq!(next.current_phase(), Some(Phase::Briefing));
    assert_eq!(next.phase_history.len(), 2);
    let reloaded = gateway(&dir).fetch("s-2").await.unwrap().unwrap();
    assert_eq!(reloaded.response_for(Phase::Initial), Some(&json!({ "choice": "start" })));
}

#[tokio::test]
async fn out_of_order_target_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway(&dir);
    gw.initialize("s-3").await.unwrap();

    let err = gw.update("s-3", UpdateRequest::new(Phase::Debrief, StepInput::empty())).await.unwrap_err();
    assert!(matches!(err, GatewayError::Rejected(_)));
    assert_eq!(gw.fetch("s-3").await.unwrap().unwrap().phase_history.len(), 1);
}

#[tokio::test]
async fn unknown_group_on_disk_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("legacy.json"),
                   json!({
                       "sessionId": "legacy",
                       "experimentGroup": "beta_cohort",
                       "phaseHistory": [{ "phase": "INITIAL", "timestamp": "2026-01-01T00:00:00Z" }]
                   }).to_string()).unwrap();

    let err = gateway(&dir).fetch("legacy").await.unwrap_err();
    assert_eq!(err, GatewayError::UnknownExperimentGroup("beta_cohort".into()));
}

#[tokio::test]
async fn unsafe_session_ids_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway(&dir);
    assert!(matches!(gw.initialize("../escape").await, Err(GatewayError::Rejected(_))));
    assert!(matches!(gw.update("missing", UpdateRequest::new(Phase::Briefing, StepInput::empty())).await,
                     Err(GatewayError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_instances_on_one_directory_accept_a_single_step() {
    let dir = tempfile::tempdir().unwrap();
    let first = gateway(&dir);
    let second = gateway(&dir);

    for round in 0..50 {
        let id = format!("race-{round}");
        first.initialize(&id).await.unwrap();

        let (left, right) = tokio::join!(first.update(&id, UpdateRequest::new(Phase::Briefing, StepInput::empty())),
                                         second.update(&id, UpdateRequest::new(Phase::Briefing, StepInput::empty())));
        let accepted = [left.is_ok(), right.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(accepted, 1, "round {round}: {left:?} / {right:?}");
        let loser = if left.is_ok() { right } else { left };
        assert!(matches!(loser, Err(GatewayError::Rejected(_))), "round {round}: {loser:?}");
        assert_eq!(second.fetch(&id).await.unwrap().unwrap().phase_history.len(), 2);
    }

    let leftovers: Vec<String> = std::fs::read_dir(dir.path()).unwrap()
                                                              .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                                                              .filter(|name| !name.ends_with(".json") && !name.ends_with(".lock"))
                                                              .collect();
    assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");
}

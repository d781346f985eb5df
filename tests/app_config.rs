use std::collections::HashMap;
use std::path::PathBuf;

use quest_core::{FlowCopy, PresentationConfig};
use quest_persistence::StoreConfig;
use questflow_rust::config::AppConfig;

fn from(pairs: &[(&str, &str)]) -> AppConfig {
    let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|key: &str| env.get(key).cloned())
}

#[test]
fn empty_environment_uses_defaults() {
    let cfg = from(&[]);
    assert_eq!(cfg.flow.presentation, PresentationConfig::default());
    assert_eq!(cfg.flow.copy, FlowCopy::default());
    assert!(cfg.session_id.is_none());
    assert!(matches!(cfg.store, StoreConfig::File { .. }));
}

#[test]
fn environment_overrides_delays_copy_and_store() {
    let cfg = from(&[("QUESTFLOW_TYPING_DELAY_MS", "10"),
                     ("QUESTFLOW_MESSAGE_DELAY_MS", "oops"),
                     ("QUESTFLOW_SURVEY_URL", "https://survey.test/q"),
                     ("QUESTFLOW_STATE_DIR", "/tmp/questflow"),
                     ("QUESTFLOW_SESSION_ID", "resume-me")]);
    assert_eq!(cfg.flow.presentation.typing_delay_ms, 10);
    assert_eq!(cfg.flow.presentation.message_delay_ms, PresentationConfig::default().message_delay_ms);
    assert_eq!(cfg.flow.copy.survey_url, "https://survey.test/q");
    assert_eq!(cfg.flow.copy.support_url, FlowCopy::default().support_url);
    assert_eq!(cfg.store, StoreConfig::File { state_dir: PathBuf::from("/tmp/questflow") });
    assert_eq!(cfg.session_id.as_deref(), Some("resume-me"));
}

mod common;

use common::{MockThermostatApi, PASSWORD, device, test_config};
use hestia::engine::{EngineCommand, SyncEngine};
use tokio::sync::mpsc;

#[tokio::test]
async fn session_restores_across_restart() {
    let mock = MockThermostatApi::new(vec![device("a")], &[("a", 18.0)]);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    {
        let (_tx, rx) = mpsc::unbounded_channel::<EngineCommand>();
        let mut engine = SyncEngine::new(config.clone(), Box::new(mock.clone()), rx);
        engine.login(None, PASSWORD).await.unwrap();
        assert!(engine.sessions().current().is_some());
    }

    // A fresh process restores the persisted session
    let (_tx, rx) = mpsc::unbounded_channel::<EngineCommand>();
    let engine = SyncEngine::new(config, Box::new(mock.clone()), rx);
    let session = engine.sessions().current().unwrap();
    assert_eq!(session.token_type, "bearer");
    assert_eq!(session.access_token, "mock-token");
}

#[tokio::test]
async fn invalidation_also_clears_the_persisted_session() {
    let mock = MockThermostatApi::new(vec![device("a")], &[("a", 18.0)]);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    {
        let (_tx, rx) = mpsc::unbounded_channel::<EngineCommand>();
        let mut engine = SyncEngine::new(config.clone(), Box::new(mock.clone()), rx);
        engine.login(None, PASSWORD).await.unwrap();
        engine.select_device("a").await.unwrap();

        mock.fail_authed(401);
        assert!(engine.toggle_program().await.is_err());
        assert!(engine.sessions().current().is_none());
    }

    // Nothing to restore after the invalidation
    let (_tx, rx) = mpsc::unbounded_channel::<EngineCommand>();
    let engine = SyncEngine::new(config, Box::new(mock.clone()), rx);
    assert!(engine.sessions().current().is_none());
}

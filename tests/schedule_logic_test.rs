mod common;

use common::{MockThermostatApi, PASSWORD, device, test_config};
use hestia::engine::{EngineCommand, SyncEngine};
use hestia::error::HestiaError;
use hestia::schedule::{format_period_triples, parse_period_triples};
use tokio::sync::mpsc;

#[test]
fn period_triples_roundtrip() {
    for text in [
        "[]",
        "[[6,9,21],[17,22,20]]",
        "[[0,23,19.5]]",
        "[[5,8,21],[11,13,20],[17,22,21.5]]",
    ] {
        let periods = parse_period_triples(text).unwrap();
        assert_eq!(format_period_triples(&periods), text, "for input {}", text);
    }
}

#[tokio::test]
async fn malformed_period_text_never_reaches_the_network() {
    let mut seeded = device("a");
    seeded.program_enabled = true;
    seeded.periods = parse_period_triples("[[6,9,21]]").unwrap();
    let mock = MockThermostatApi::new(vec![seeded], &[("a", 18.0)]);
    let dir = tempfile::tempdir().unwrap();
    let (_tx, rx) = mpsc::unbounded_channel::<EngineCommand>();
    let mut engine = SyncEngine::new(test_config(&dir), Box::new(mock.clone()), rx);
    let mut display = engine.subscribe();

    engine.login(None, PASSWORD).await.unwrap();
    engine.select_device("a").await.unwrap();

    for text in ["not json", "[[6,9]]", "[[6,9,21,4]]", "[[\"six\",9,21]]"] {
        let err = engine.submit_periods(text).await.unwrap_err();
        assert!(
            matches!(err, HestiaError::MalformedInput { .. }),
            "for input {}",
            text
        );
    }
    assert_eq!(mock.period_calls(), 0);

    // The previously submitted schedule stays displayed
    let state = display.borrow_and_update().clone();
    assert_eq!(state.selected.unwrap().periods_text, "[[6,9,21]]");

    // Session untouched: malformed input is local and recoverable
    assert!(engine.sessions().current().is_some());
    engine.submit_periods("[[6,9,21],[17,22,20]]").await.unwrap();
    assert_eq!(mock.period_calls(), 1);
}

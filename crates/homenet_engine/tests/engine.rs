use std::sync::Arc;
use std::time::Duration;

use homenet_engine::{
    BoardPage, EngineEvent, EngineHandle, EntityFields, EntityId, EntityKind, FailureKind,
    HomenetApi, RequestError, SubmitMode,
};
use pretty_assertions::assert_eq;

const WAIT: Duration = Duration::from_secs(5);

/// Answers prompts after a per-prompt delay; `"slow"` never answers in time.
struct ScriptedApi;

#[async_trait::async_trait]
impl HomenetApi for ScriptedApi {
    async fn ask(&self, prompt: &str) -> Result<String, RequestError> {
        let delay = if prompt == "slow" {
            Duration::from_secs(30)
        } else {
            Duration::from_millis(10)
        };
        tokio::time::sleep(delay).await;
        Ok(format!("echo: {prompt}"))
    }

    async fn load_board(&self, _kind: EntityKind) -> Result<BoardPage, RequestError> {
        Ok(BoardPage {
            cards: Vec::new(),
            count_text: Some("0 movies in your list".to_string()),
        })
    }

    async fn submit_entity(
        &self,
        _kind: EntityKind,
        _mode: SubmitMode,
        fields: &EntityFields,
    ) -> Result<BoardPage, RequestError> {
        Ok(BoardPage {
            cards: Vec::new(),
            count_text: Some(format!("added {}", fields.title)),
        })
    }

    async fn delete_entity(&self, _kind: EntityKind, _id: EntityId) -> Result<(), RequestError> {
        Ok(())
    }

    async fn random_entity(&self, _kind: EntityKind) -> Result<String, RequestError> {
        Ok("<h4>Heat</h4>".to_string())
    }
}

fn engine() -> EngineHandle {
    EngineHandle::with_api(Arc::new(ScriptedApi)).expect("engine starts")
}

#[test]
fn answered_query_settles_with_body() {
    let engine = engine();
    engine.ask(1, "hello");

    let event = engine.recv_timeout(WAIT).expect("settlement");
    assert_eq!(
        event,
        EngineEvent::QuerySettled {
            request_id: 1,
            result: Ok("echo: hello".to_string()),
        }
    );
}

#[test]
fn cancelled_query_settles_as_cancelled() {
    let engine = engine();
    engine.ask(1, "slow");
    engine.cancel(1);

    match engine.recv_timeout(WAIT).expect("settlement") {
        EngineEvent::QuerySettled { request_id, result } => {
            assert_eq!(request_id, 1);
            assert_eq!(result.unwrap_err().kind, FailureKind::Cancelled);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn cancelling_one_request_leaves_another_running() {
    let engine = engine();
    engine.ask(1, "slow");
    engine.ask(2, "fast");
    engine.cancel(1);

    let mut settled = Vec::new();
    for _ in 0..2 {
        match engine.recv_timeout(WAIT).expect("settlement") {
            EngineEvent::QuerySettled { request_id, result } => settled.push((request_id, result)),
            other => panic!("unexpected event: {other:?}"),
        }
    }
    settled.sort_by_key(|(request_id, _)| *request_id);

    assert!(settled[0].1.as_ref().is_err_and(RequestError::is_cancelled));
    assert_eq!(settled[1], (2, Ok("echo: fast".to_string())));
}

#[test]
fn cancel_after_settlement_is_ignored() {
    let engine = engine();
    engine.ask(5, "quick");
    let first = engine.recv_timeout(WAIT).expect("settlement");
    assert!(matches!(first, EngineEvent::QuerySettled { request_id: 5, result: Ok(_) }));

    engine.cancel(5);
    assert_eq!(engine.recv_timeout(Duration::from_millis(200)), None);
}

#[test]
fn board_commands_report_their_results() {
    let engine = engine();
    engine.delete(EntityKind::TvShow, 4);
    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::EntityDeleted {
            kind: EntityKind::TvShow,
            id: 4,
            result: Ok(()),
        })
    );

    engine.random(EntityKind::Movie);
    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::RandomFetched {
            kind: EntityKind::Movie,
            result: Ok("<h4>Heat</h4>".to_string()),
        })
    );

    engine.submit(
        EntityKind::Movie,
        SubmitMode::Add,
        EntityFields {
            title: "Ran".to_string(),
            ..EntityFields::default()
        },
    );
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::FormSubmitted { mode, result, .. }) => {
            assert_eq!(mode, SubmitMode::Add);
            assert_eq!(result.unwrap().count_text.as_deref(), Some("added Ran"));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    engine.load_board(EntityKind::Movie);
    assert!(matches!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::BoardLoaded { kind: EntityKind::Movie, result: Ok(_) })
    ));
}

#[test]
fn shutdown_cancels_in_flight_requests() {
    let engine = engine();
    engine.ask(9, "slow");
    std::thread::sleep(Duration::from_millis(50));
    engine.shutdown();
}

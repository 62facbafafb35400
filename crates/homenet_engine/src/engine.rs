use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::client::{ClientSettings, HomenetApi, ReqwestClient};
use crate::{EngineEvent, EntityFields, EntityId, EntityKind, RequestError, RequestId, SubmitMode};

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to build http client: {0}")]
    Client(RequestError),
}

enum EngineCommand {
    Ask { request_id: RequestId, prompt: String },
    Cancel { request_id: RequestId },
    LoadBoard { kind: EntityKind },
    Submit {
        kind: EntityKind,
        mode: SubmitMode,
        fields: EntityFields,
    },
    Delete { kind: EntityKind, id: EntityId },
    Random { kind: EntityKind },
    Shutdown,
}

type TokenMap = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// Runs requests on a background tokio runtime and reports settlements as
/// [`EngineEvent`]s.
///
/// Every AI request gets its own cancellation token, so cancelling one never
/// touches another.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let client = ReqwestClient::new(settings).map_err(EngineError::Client)?;
        Self::with_api(Arc::new(client))
    }

    /// Starts the engine over any [`HomenetApi`] implementation.
    pub fn with_api(api: Arc<dyn HomenetApi>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        let worker = thread::spawn(move || {
            let tokens: TokenMap = Arc::new(Mutex::new(HashMap::new()));
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Shutdown => {
                        cancel_all(&tokens);
                        break;
                    }
                    EngineCommand::Cancel { request_id } => cancel_one(&tokens, request_id),
                    EngineCommand::Ask { request_id, prompt } => {
                        let token = CancellationToken::new();
                        lock(&tokens).insert(request_id, token.clone());
                        runtime.spawn(run_ask(
                            api.clone(),
                            tokens.clone(),
                            token,
                            request_id,
                            prompt,
                            event_tx.clone(),
                        ));
                    }
                    other => {
                        runtime.spawn(run_board(api.clone(), other, event_tx.clone()));
                    }
                }
            }
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
            engine_debug!("Engine worker stopped");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        })
    }

    pub fn ask(&self, request_id: RequestId, prompt: impl Into<String>) {
        self.send(EngineCommand::Ask {
            request_id,
            prompt: prompt.into(),
        });
    }

    /// Signals the request's token. The request still settles, with
    /// [`crate::FailureKind::Cancelled`] unless it had already finished.
    pub fn cancel(&self, request_id: RequestId) {
        self.send(EngineCommand::Cancel { request_id });
    }

    pub fn load_board(&self, kind: EntityKind) {
        self.send(EngineCommand::LoadBoard { kind });
    }

    pub fn submit(&self, kind: EntityKind, mode: SubmitMode, fields: EntityFields) {
        self.send(EngineCommand::Submit { kind, mode, fields });
    }

    pub fn delete(&self, kind: EntityKind, id: EntityId) {
        self.send(EngineCommand::Delete { kind, id });
    }

    pub fn random(&self, kind: EntityKind) {
        self.send(EngineCommand::Random { kind });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the worker is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Cancels everything in flight and waits for the worker to stop.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                engine_warn!("Engine worker panicked during shutdown");
            }
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine worker is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(tokens: &TokenMap) -> std::sync::MutexGuard<'_, HashMap<RequestId, CancellationToken>> {
    tokens.lock().unwrap_or_else(PoisonError::into_inner)
}

fn cancel_one(tokens: &TokenMap, request_id: RequestId) {
    match lock(tokens).get(&request_id) {
        Some(token) => {
            engine_info!("Cancelling request {}", request_id);
            token.cancel();
        }
        None => engine_debug!("Cancel for request {} ignored; already settled", request_id),
    }
}

fn cancel_all(tokens: &TokenMap) {
    for (request_id, token) in lock(tokens).iter() {
        engine_debug!("Cancelling request {} on shutdown", request_id);
        token.cancel();
    }
}

async fn run_ask(
    api: Arc<dyn HomenetApi>,
    tokens: TokenMap,
    token: CancellationToken,
    request_id: RequestId,
    prompt: String,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let result = tokio::select! {
        _ = token.cancelled() => Err(RequestError::cancelled()),
        result = api.ask(&prompt) => result,
    };
    lock(&tokens).remove(&request_id);
    let _ = event_tx.send(EngineEvent::QuerySettled { request_id, result });
}

async fn run_board(
    api: Arc<dyn HomenetApi>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::LoadBoard { kind } => EngineEvent::BoardLoaded {
            kind,
            result: api.load_board(kind).await,
        },
        EngineCommand::Submit { kind, mode, fields } => EngineEvent::FormSubmitted {
            kind,
            mode,
            result: api.submit_entity(kind, mode, &fields).await,
        },
        EngineCommand::Delete { kind, id } => EngineEvent::EntityDeleted {
            kind,
            id,
            result: api.delete_entity(kind, id).await,
        },
        EngineCommand::Random { kind } => EngineEvent::RandomFetched {
            kind,
            result: api.random_entity(kind).await,
        },
        EngineCommand::Ask { .. } | EngineCommand::Cancel { .. } | EngineCommand::Shutdown => {
            return;
        }
    };
    let _ = event_tx.send(event);
}

use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use homenet_core::{
    BoardSnapshot, Card, DeleteFailure, Effect, EntityForm, EntityKind, FormMode, Msg,
    QueryOutcome,
};
use homenet_engine::{
    BoardPage, CardRecord, EngineEvent, EngineHandle, EntityFields, FailureKind, RequestError,
    SubmitMode,
};

/// Executes core effects on the engine and turns engine events back into
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendQuery { request_id, prompt } => {
                    engine_info!(
                        "SendQuery request_id={} prompt_len={}",
                        request_id,
                        prompt.len()
                    );
                    self.engine.ask(request_id, prompt);
                }
                Effect::CancelQuery { request_id } => {
                    engine_info!("CancelQuery request_id={}", request_id);
                    self.engine.cancel(request_id);
                }
                Effect::LoadBoard { kind } => {
                    engine_debug!("LoadBoard kind={}", kind);
                    self.engine.load_board(map_kind(kind));
                }
                Effect::DeleteEntity { kind, id } => {
                    engine_info!("DeleteEntity kind={} id={}", kind, id);
                    self.engine.delete(map_kind(kind), id);
                }
                Effect::FetchRandom { kind } => {
                    engine_debug!("FetchRandom kind={}", kind);
                    self.engine.random(map_kind(kind));
                }
                Effect::SubmitEntityForm { kind, mode, form } => {
                    engine_info!("SubmitEntityForm kind={} mode={:?}", kind, mode);
                    self.engine
                        .submit(map_kind(kind), map_mode(mode), map_form(&form));
                }
            }
        }
    }

    pub fn try_next_msg(&self) -> Option<Msg> {
        self.engine.try_recv().map(map_event)
    }

    pub fn next_msg_timeout(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }

    /// Blocks until the engine reports something.
    pub fn next_msg(&self) -> Option<Msg> {
        self.engine.recv().map(map_event)
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::QuerySettled { request_id, result } => {
            let outcome = match result {
                Ok(body) => QueryOutcome::Answered(body),
                Err(err) if err.is_cancelled() => QueryOutcome::Cancelled,
                Err(err) => {
                    engine_warn!("Request {} failed: {}", request_id, err);
                    QueryOutcome::Failed {
                        detail: err.to_string(),
                    }
                }
            };
            Msg::QuerySettled {
                request_id,
                outcome,
            }
        }
        EngineEvent::BoardLoaded { kind, result } => match result {
            Ok(page) => Msg::BoardLoaded {
                kind: unmap_kind(kind),
                snapshot: map_page(page),
            },
            Err(err) => Msg::BoardLoadFailed {
                kind: unmap_kind(kind),
                detail: err.to_string(),
            },
        },
        EngineEvent::FormSubmitted { kind, mode, result } => Msg::FormSettled {
            kind: unmap_kind(kind),
            mode: match mode {
                SubmitMode::Add => FormMode::Add,
                SubmitMode::Edit => FormMode::Edit,
            },
            result: result.map(map_page).map_err(|err| err.to_string()),
        },
        EngineEvent::EntityDeleted { kind, id, result } => Msg::DeleteSettled {
            kind: unmap_kind(kind),
            id,
            result: result.map_err(map_delete_failure),
        },
        EngineEvent::RandomFetched { kind, result } => Msg::RandomSettled {
            kind: unmap_kind(kind),
            result: result.map_err(|err| err.to_string()),
        },
    }
}

fn map_delete_failure(err: RequestError) -> DeleteFailure {
    match err.kind {
        FailureKind::HttpStatus(status) => DeleteFailure::Status(status),
        _ => DeleteFailure::Transport(err.to_string()),
    }
}

fn map_kind(kind: EntityKind) -> homenet_engine::EntityKind {
    match kind {
        EntityKind::Movie => homenet_engine::EntityKind::Movie,
        EntityKind::TvShow => homenet_engine::EntityKind::TvShow,
    }
}

fn unmap_kind(kind: homenet_engine::EntityKind) -> EntityKind {
    match kind {
        homenet_engine::EntityKind::Movie => EntityKind::Movie,
        homenet_engine::EntityKind::TvShow => EntityKind::TvShow,
    }
}

fn map_mode(mode: FormMode) -> SubmitMode {
    match mode {
        FormMode::Add => SubmitMode::Add,
        FormMode::Edit => SubmitMode::Edit,
    }
}

fn map_form(form: &EntityForm) -> EntityFields {
    EntityFields {
        id: form.id,
        title: form.title.clone(),
        year: form.year.clone(),
        genre: form.genre.clone(),
        streaming: form.streaming.clone(),
        notes: form.notes.clone(),
        imdb_link: form.imdb_link.clone(),
        flag: form.flag,
    }
}

fn map_page(page: BoardPage) -> BoardSnapshot {
    BoardSnapshot {
        cards: page.cards.into_iter().map(map_card).collect(),
        count_text: page.count_text,
    }
}

fn map_card(record: CardRecord) -> Card {
    Card {
        id: record.id,
        title: record.title,
        year: record.year,
        genre: record.genre,
        streaming: record.streaming,
        notes: record.notes,
        imdb_link: record.imdb_link,
        flag: record.flag,
    }
}

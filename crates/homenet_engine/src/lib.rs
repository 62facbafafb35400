//! Homenet engine: HTTP client for the homenet server, the cancellable
//! request worker and file persistence.
mod board_page;
mod client;
mod engine;
mod persist;
mod types;

pub use board_page::parse_board_html;
pub use client::{encode_fields, ClientSettings, HomenetApi, ReqwestClient};
pub use engine::{EngineError, EngineHandle};
pub use persist::{ensure_parent_dir, AtomicFileWriter, PersistError};
pub use types::{
    BoardPage, CardRecord, EngineEvent, EntityFields, EntityId, EntityKind, FailureKind,
    RequestError, RequestId, SubmitMode,
};

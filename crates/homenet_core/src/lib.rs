//! Homenet core: pure chat/board state machine, view-model helpers and the
//! response text renderer.
mod board;
mod chat;
mod effect;
pub mod markup;
mod msg;
mod state;
mod update;
mod view_model;

pub use board::{
    count_label, empty_state_html, parse_count, random_failure_html, BoardSnapshot, BoardState,
    Card, DeleteFailure, EntityForm, EntityId, EntityKind, FormMode,
};
pub use chat::{
    response_container_html, user_echo_html, CancelHandle, ChatState, NodeContent, NodeId,
    QueryOutcome, RequestId, RequestPhase, Settlement, TranscriptEntry, CANCELLED_HTML,
    CONNECTION_ERROR_HTML, WELCOME_HTML,
};
pub use effect::Effect;
pub use markup::{escape_html, render};
pub use msg::Msg;
pub use state::AppState;
pub use update::update;
pub use view_model::{
    AppViewModel, BoardViewModel, ChatViewModel, EditModalView, EntryRole, TranscriptEntryView,
};

/// Preference key for the chat page's log level.
pub const AI_LOG_LEVEL_KEY: &str = "ai_log_level";

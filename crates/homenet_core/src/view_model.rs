use crate::{Card, EntityForm, EntityKind, RequestPhase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub chat: ChatViewModel,
    pub movies: BoardViewModel,
    pub tvshows: BoardViewModel,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn board(&self, kind: EntityKind) -> &BoardViewModel {
        match kind {
            EntityKind::Movie => &self.movies,
            EntityKind::TvShow => &self.tvshows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatViewModel {
    pub phase: RequestPhase,
    pub input: String,
    pub loading_visible: bool,
    pub send_visible: bool,
    pub stop_visible: bool,
    pub focus_input: bool,
    pub entries: Vec<TranscriptEntryView>,
}

impl ChatViewModel {
    /// Inner HTML of the Display Node with the given element id.
    pub fn node_html(&self, node_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.node_id.as_deref() == Some(node_id))
            .map(|entry| entry.content_html.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRole {
    Notice,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntryView {
    pub role: EntryRole,
    /// Element id of the Display Node, for assistant entries.
    pub node_id: Option<String>,
    pub pending: bool,
    pub content_html: String,
    /// Full entry markup including the speaker label.
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardViewModel {
    pub kind: EntityKind,
    pub cards: Vec<Card>,
    pub count_text: String,
    pub empty_state_html: Option<String>,
    pub add_form_visible: bool,
    pub add_draft: EntityForm,
    pub toggle_text: String,
    pub toggle_classes: String,
    pub edit_modal: Option<EditModalView>,
    pub random_modal_visible: bool,
    pub random_modal_html: String,
    /// Confirmation question while a delete awaits the user's answer.
    pub confirm_prompt: Option<String>,
    /// Blocking alert text.
    pub alert: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditModalView {
    pub flag_field: &'static str,
    pub form: EntityForm,
}

use std::fmt;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use crate::view_model::{BoardViewModel, EditModalView};
use crate::Effect;

pub type EntityId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Movie,
    TvShow,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Movie, EntityKind::TvShow];

    /// Path and attribute segment: `movie`, `tvshow`.
    pub fn slug(self) -> &'static str {
        match self {
            EntityKind::Movie => "movie",
            EntityKind::TvShow => "tvshow",
        }
    }

    /// Slug with its first letter upper-cased, as used on the add-form toggle.
    pub fn capitalized(self) -> &'static str {
        match self {
            EntityKind::Movie => "Movie",
            EntityKind::TvShow => "Tvshow",
        }
    }

    /// Name of the boolean form field carried by this kind.
    pub fn flag_field(self) -> &'static str {
        match self {
            EntityKind::Movie => "available_now",
            EntityKind::TvShow => "active_season",
        }
    }

    /// Preference key for this board's log level.
    pub fn log_level_key(self) -> &'static str {
        match self {
            EntityKind::Movie => "movie_board_log_level",
            EntityKind::TvShow => "tv_shows_board_log_level",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Card {
    pub id: EntityId,
    pub title: String,
    pub year: Option<u32>,
    pub genre: String,
    pub streaming: String,
    pub notes: String,
    pub imdb_link: String,
    /// `available_now` for movies, `active_season` for TV shows.
    pub flag: bool,
}

/// Field values of the add and edit forms. `id` is only set when editing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityForm {
    pub id: Option<EntityId>,
    pub title: String,
    pub year: String,
    pub genre: String,
    pub streaming: String,
    pub notes: String,
    pub imdb_link: String,
    pub flag: bool,
}

impl EntityForm {
    pub fn from_card(card: &Card) -> Self {
        Self {
            id: Some(card.id),
            title: card.title.clone(),
            year: card.year.map(|year| year.to_string()).unwrap_or_default(),
            genre: card.genre.clone(),
            streaming: card.streaming.clone(),
            notes: card.notes.clone(),
            imdb_link: card.imdb_link.clone(),
            flag: card.flag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit,
}

/// Cards and count label as rendered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardSnapshot {
    pub cards: Vec<Card>,
    pub count_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteFailure {
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The request never produced a response.
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    kind: EntityKind,
    cards: Vec<Card>,
    count_text: String,
    empty: bool,
    add_form_visible: bool,
    add_draft: EntityForm,
    edit: Option<EntityForm>,
    random_visible: bool,
    random_html: String,
    pending_delete: Option<EntityId>,
    alert: Option<String>,
}

impl BoardState {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            cards: Vec::new(),
            count_text: count_label(kind, 0),
            empty: true,
            add_form_visible: false,
            add_draft: EntityForm::default(),
            edit: None,
            random_visible: false,
            random_html: String::new(),
            pending_delete: None,
            alert: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn count_text(&self) -> &str {
        &self.count_text
    }

    pub fn pending_delete(&self) -> Option<EntityId> {
        self.pending_delete
    }

    pub(crate) fn load(&mut self, snapshot: BoardSnapshot) {
        engine_info!(
            "{} board loaded with {} cards",
            self.kind,
            snapshot.cards.len()
        );
        self.count_text = snapshot
            .count_text
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| count_label(self.kind, snapshot.cards.len() as u64));
        self.empty = snapshot.cards.is_empty();
        self.cards = snapshot.cards;
    }

    pub(crate) fn load_failed(&mut self, detail: &str) {
        engine_error!("Failed to load {} board: {}", self.kind, detail);
        self.alert = Some(format!("Failed to load {}s: {}", self.kind, detail));
    }

    pub(crate) fn toggle_add_form(&mut self) {
        engine_info!("Toggling add {} form", self.kind);
        if self.add_form_visible {
            engine_debug!("Hiding add {} form", self.kind);
            self.add_form_visible = false;
            self.add_draft = EntityForm::default();
            engine_debug!("Form fields cleared");
        } else {
            engine_debug!("Showing add {} form", self.kind);
            self.add_form_visible = true;
        }
    }

    pub(crate) fn set_add_draft(&mut self, form: EntityForm) {
        self.add_draft = EntityForm { id: None, ..form };
    }

    pub(crate) fn submit_add(&mut self) -> Option<Vec<Effect>> {
        let form = self.add_draft.clone();
        self.submit_form(FormMode::Add, form)
    }

    pub(crate) fn open_edit(&mut self, id: EntityId) -> bool {
        let Some(card) = self.cards.iter().find(|card| card.id == id) else {
            engine_warn!("Edit requested for unknown {} {}", self.kind, id);
            return false;
        };
        engine_info!(
            "Opening edit modal for {}: {} ID: {}",
            self.kind,
            card.title,
            id
        );
        self.edit = Some(EntityForm::from_card(card));
        engine_debug!("Edit form populated with data");
        true
    }

    pub(crate) fn set_edit_draft(&mut self, form: EntityForm) -> bool {
        match self.edit.as_mut() {
            Some(current) => {
                *current = EntityForm {
                    id: current.id,
                    ..form
                };
                true
            }
            None => {
                engine_warn!("Edit draft changed while no {} edit modal is open", self.kind);
                false
            }
        }
    }

    pub(crate) fn submit_edit(&mut self) -> Option<Vec<Effect>> {
        let Some(form) = self.edit.clone() else {
            engine_warn!("Edit submitted while no {} edit modal is open", self.kind);
            return None;
        };
        self.submit_form(FormMode::Edit, form)
    }

    pub(crate) fn close_edit(&mut self) -> bool {
        engine_debug!("Closing edit modal");
        self.edit.take().is_some()
    }

    fn submit_form(&mut self, mode: FormMode, form: EntityForm) -> Option<Vec<Effect>> {
        if form.title.trim().is_empty() {
            engine_warn!("Empty {} title submitted", self.kind);
            return None;
        }
        engine_info!("Submitting {:?} form for {}: {}", mode, self.kind, form.title);
        Some(vec![Effect::SubmitEntityForm {
            kind: self.kind,
            mode,
            form,
        }])
    }

    pub(crate) fn form_settled(&mut self, mode: FormMode, result: Result<BoardSnapshot, String>) {
        match result {
            Ok(snapshot) => {
                self.load(snapshot);
                match mode {
                    FormMode::Add => self.add_draft = EntityForm::default(),
                    FormMode::Edit => self.edit = None,
                }
            }
            Err(detail) => {
                engine_error!("Failed to submit {} form: {}", self.kind, detail);
                let verb = match mode {
                    FormMode::Add => "add",
                    FormMode::Edit => "update",
                };
                self.alert = Some(format!("Failed to {verb} {}: {detail}", self.kind));
            }
        }
    }

    pub(crate) fn request_delete(&mut self, id: EntityId) -> bool {
        let Some(card) = self.cards.iter().find(|card| card.id == id) else {
            engine_warn!("Delete requested for unknown {} {}", self.kind, id);
            return false;
        };
        engine_warn!("Delete {} requested: {} ID: {}", self.kind, card.title, id);
        self.pending_delete = Some(id);
        true
    }

    pub(crate) fn confirm_delete(&mut self) -> Option<Vec<Effect>> {
        let id = self.pending_delete.take()?;
        engine_info!("Delete confirmed, sending delete request");
        Some(vec![Effect::DeleteEntity {
            kind: self.kind,
            id,
        }])
    }

    pub(crate) fn decline_delete(&mut self) -> bool {
        let declined = self.pending_delete.take().is_some();
        if declined {
            engine_info!("Delete cancelled by user");
        }
        declined
    }

    /// Removes the card and recomputes the count from the current label.
    pub(crate) fn delete_settled(&mut self, id: EntityId, result: Result<(), DeleteFailure>) {
        match result {
            Ok(()) => {
                engine_info!("{} deleted successfully from server", self.kind);
                if let Some(position) = self.cards.iter().position(|card| card.id == id) {
                    self.cards.remove(position);
                    engine_debug!("{} card removed", self.kind);
                }
                let current = match parse_count(&self.count_text) {
                    Some(count) => count,
                    None => {
                        engine_warn!(
                            "Count label {:?} has no number; recounting cards",
                            self.count_text
                        );
                        self.cards.len() as u64 + 1
                    }
                };
                let remaining = current.saturating_sub(1);
                if remaining == 0 {
                    engine_info!("No {}s remaining, showing empty state", self.kind);
                    self.empty = true;
                } else {
                    engine_debug!("{} count updated to: {}", self.kind, remaining);
                }
                self.count_text = count_label(self.kind, remaining);
            }
            Err(DeleteFailure::Status(status)) => {
                engine_error!(
                    "Failed to delete {} from server, status: {}",
                    self.kind,
                    status
                );
                self.alert = Some(format!("Failed to delete {}", self.kind));
            }
            Err(DeleteFailure::Transport(detail)) => {
                engine_error!("Delete request failed: {}", detail);
                self.alert = Some(format!("Failed to delete {}: {detail}", self.kind));
            }
        }
    }

    pub(crate) fn random_settled(&mut self, result: Result<String, String>) {
        match result {
            Ok(html) => {
                engine_debug!("Random {} HTML received, length: {}", self.kind, html.len());
                self.random_html = html;
                engine_info!("Random {} modal displayed", self.kind);
            }
            Err(detail) => {
                engine_error!("Failed to fetch random {}: {}", self.kind, detail);
                self.random_html = random_failure_html(self.kind);
            }
        }
        self.random_visible = true;
    }

    pub(crate) fn close_random(&mut self) -> bool {
        engine_debug!("Closing random {} modal", self.kind);
        std::mem::take(&mut self.random_visible)
    }

    pub(crate) fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    pub(crate) fn view(&self) -> BoardViewModel {
        let (toggle_text, toggle_classes) = if self.add_form_visible {
            ("Hide Form".to_string(), "bg-gray-600 hover:bg-gray-700")
        } else {
            (
                format!("Add New {}", self.kind.capitalized()),
                "bg-blue-600 hover:bg-blue-700",
            )
        };
        BoardViewModel {
            kind: self.kind,
            cards: if self.empty { Vec::new() } else { self.cards.clone() },
            count_text: self.count_text.clone(),
            empty_state_html: self.empty.then(|| empty_state_html(self.kind)),
            add_form_visible: self.add_form_visible,
            add_draft: self.add_draft.clone(),
            toggle_text,
            toggle_classes: toggle_classes.to_string(),
            edit_modal: self.edit.clone().map(|form| EditModalView {
                flag_field: self.kind.flag_field(),
                form,
            }),
            random_modal_visible: self.random_visible,
            random_modal_html: self.random_html.clone(),
            confirm_prompt: self
                .pending_delete
                .map(|_| format!("Are you sure you want to delete this {}?", self.kind)),
            alert: self.alert.clone(),
        }
    }
}

/// `"{n} {kind}s in your list"`. No singular form.
pub fn count_label(kind: EntityKind, count: u64) -> String {
    format!("{count} {kind}s in your list")
}

/// First run of ASCII digits in `text`.
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

pub fn empty_state_html(kind: EntityKind) -> String {
    format!(
        r#"<div class="text-center py-8"><p class="text-gray-400">No {kind}s added yet. Add your first {kind} above!</p></div>"#
    )
}

pub fn random_failure_html(kind: EntityKind) -> String {
    format!(r#"<div class="text-center text-red-400">Failed to fetch a random {kind}.</div>"#)
}

use crate::board::BoardState;
use crate::chat::ChatState;
use crate::view_model::AppViewModel;
use crate::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    chat: ChatState,
    movies: BoardState,
    tvshows: BoardState,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            chat: ChatState::default(),
            movies: BoardState::new(EntityKind::Movie),
            tvshows: BoardState::new(EntityKind::TvShow),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chat(&self) -> &ChatState {
        &self.chat
    }

    pub fn board(&self, kind: EntityKind) -> &BoardState {
        match kind {
            EntityKind::Movie => &self.movies,
            EntityKind::TvShow => &self.tvshows,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            chat: self.chat.view(),
            movies: self.movies.view(),
            tvshows: self.tvshows.view(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Returns whether the input should take focus, and clears the request.
    pub fn consume_focus_request(&mut self) -> bool {
        self.chat.take_focus_request()
    }

    pub(crate) fn chat_mut(&mut self) -> &mut ChatState {
        &mut self.chat
    }

    pub(crate) fn board_mut(&mut self, kind: EntityKind) -> &mut BoardState {
        match kind {
            EntityKind::Movie => &mut self.movies,
            EntityKind::TvShow => &mut self.tvshows,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

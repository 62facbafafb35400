use std::fmt;

pub type RequestId = u64;
pub type EntityId = u64;

/// Board entity as addressed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Movie,
    TvShow,
}

impl EntityKind {
    /// Path segment and `data-*` attribute prefix.
    pub fn slug(self) -> &'static str {
        match self {
            EntityKind::Movie => "movie",
            EntityKind::TvShow => "tvshow",
        }
    }

    /// Form field (and `data-*` suffix, dashed) of the kind's boolean flag.
    pub fn flag_field(self) -> &'static str {
        match self {
            EntityKind::Movie => "available_now",
            EntityKind::TvShow => "active_season",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Add,
    Edit,
}

impl SubmitMode {
    pub fn path_segment(self) -> &'static str {
        match self {
            SubmitMode::Add => "add",
            SubmitMode::Edit => "edit",
        }
    }
}

/// Form fields sent on add and edit. `id` is only sent when editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityFields {
    pub id: Option<EntityId>,
    pub title: String,
    pub year: String,
    pub genre: String,
    pub streaming: String,
    pub notes: String,
    pub imdb_link: String,
    pub flag: bool,
}

/// One card as read back from server markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardRecord {
    pub id: EntityId,
    pub title: String,
    pub year: Option<u32>,
    pub genre: String,
    pub streaming: String,
    pub notes: String,
    pub imdb_link: String,
    pub flag: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardPage {
    pub cards: Vec<CardRecord>,
    pub count_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    QuerySettled {
        request_id: RequestId,
        result: Result<String, RequestError>,
    },
    BoardLoaded {
        kind: EntityKind,
        result: Result<BoardPage, RequestError>,
    },
    FormSubmitted {
        kind: EntityKind,
        mode: SubmitMode,
        result: Result<BoardPage, RequestError>,
    },
    EntityDeleted {
        kind: EntityKind,
        id: EntityId,
        result: Result<(), RequestError>,
    },
    RandomFetched {
        kind: EntityKind,
        result: Result<String, RequestError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "request cancelled")
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == FailureKind::Cancelled
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RequestError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Cancelled,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Parse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Parse => write!(f, "unparseable response"),
        }
    }
}

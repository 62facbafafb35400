use crate::{
    BoardSnapshot, DeleteFailure, EntityForm, EntityId, EntityKind, FormMode, QueryOutcome,
    RequestId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the chat input.
    InputChanged(String),
    /// User submitted the chat input. The platform supplies the wall clock so
    /// the update stays pure.
    SubmitClicked { submitted_at_ms: u64 },
    /// User clicked Stop.
    CancelClicked,
    ClearChatClicked,
    /// Engine settlement for an AI request.
    QuerySettled {
        request_id: RequestId,
        outcome: QueryOutcome,
    },
    LoadBoardRequested(EntityKind),
    BoardLoaded {
        kind: EntityKind,
        snapshot: BoardSnapshot,
    },
    BoardLoadFailed { kind: EntityKind, detail: String },
    ToggleAddFormClicked(EntityKind),
    AddDraftChanged { kind: EntityKind, form: EntityForm },
    AddFormSubmitted(EntityKind),
    EditClicked { kind: EntityKind, id: EntityId },
    EditDraftChanged { kind: EntityKind, form: EntityForm },
    EditFormSubmitted(EntityKind),
    EditClosed(EntityKind),
    /// Engine completion of an add or edit submission.
    FormSettled {
        kind: EntityKind,
        mode: FormMode,
        result: Result<BoardSnapshot, String>,
    },
    DeleteClicked { kind: EntityKind, id: EntityId },
    DeleteConfirmed(EntityKind),
    DeleteDeclined(EntityKind),
    DeleteSettled {
        kind: EntityKind,
        id: EntityId,
        result: Result<(), DeleteFailure>,
    },
    RandomClicked(EntityKind),
    /// `Ok` carries the fragment whatever the status; `Err` is a transport failure.
    RandomSettled {
        kind: EntityKind,
        result: Result<String, String>,
    },
    RandomClosed(EntityKind),
    AlertDismissed(EntityKind),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

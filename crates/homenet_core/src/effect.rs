use crate::{EntityForm, EntityId, EntityKind, FormMode, RequestId};

/// Side effects requested by [`crate::update`], executed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST the prompt to the AI endpoint under a fresh cancellation handle.
    SendQuery { request_id: RequestId, prompt: String },
    /// Signal the handle of an in-flight AI request.
    CancelQuery { request_id: RequestId },
    LoadBoard { kind: EntityKind },
    DeleteEntity { kind: EntityKind, id: EntityId },
    FetchRandom { kind: EntityKind },
    SubmitEntityForm {
        kind: EntityKind,
        mode: FormMode,
        form: EntityForm,
    },
}

use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Ignored messages (a second submit while a request is in flight, a stop
/// with nothing to stop, a stale settlement) leave the state untouched and
/// do not mark it dirty.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let (changed, effects) = match msg {
        Msg::InputChanged(text) => {
            state.chat_mut().set_input(text);
            (true, Vec::new())
        }
        Msg::SubmitClicked { submitted_at_ms } => {
            with_effects(state.chat_mut().submit(submitted_at_ms))
        }
        Msg::CancelClicked => with_effects(state.chat_mut().cancel()),
        Msg::ClearChatClicked => {
            state.chat_mut().clear();
            (true, Vec::new())
        }
        Msg::QuerySettled {
            request_id,
            outcome,
        } => (state.chat_mut().settle(request_id, outcome), Vec::new()),
        Msg::LoadBoardRequested(kind) => (false, vec![Effect::LoadBoard { kind }]),
        Msg::BoardLoaded { kind, snapshot } => {
            state.board_mut(kind).load(snapshot);
            (true, Vec::new())
        }
        Msg::BoardLoadFailed { kind, detail } => {
            state.board_mut(kind).load_failed(&detail);
            (true, Vec::new())
        }
        Msg::ToggleAddFormClicked(kind) => {
            state.board_mut(kind).toggle_add_form();
            (true, Vec::new())
        }
        Msg::AddDraftChanged { kind, form } => {
            state.board_mut(kind).set_add_draft(form);
            (true, Vec::new())
        }
        Msg::AddFormSubmitted(kind) => with_effects(state.board_mut(kind).submit_add()),
        Msg::EditClicked { kind, id } => (state.board_mut(kind).open_edit(id), Vec::new()),
        Msg::EditDraftChanged { kind, form } => {
            (state.board_mut(kind).set_edit_draft(form), Vec::new())
        }
        Msg::EditFormSubmitted(kind) => with_effects(state.board_mut(kind).submit_edit()),
        Msg::EditClosed(kind) => (state.board_mut(kind).close_edit(), Vec::new()),
        Msg::FormSettled { kind, mode, result } => {
            state.board_mut(kind).form_settled(mode, result);
            (true, Vec::new())
        }
        Msg::DeleteClicked { kind, id } => (state.board_mut(kind).request_delete(id), Vec::new()),
        Msg::DeleteConfirmed(kind) => with_effects(state.board_mut(kind).confirm_delete()),
        Msg::DeleteDeclined(kind) => (state.board_mut(kind).decline_delete(), Vec::new()),
        Msg::DeleteSettled { kind, id, result } => {
            state.board_mut(kind).delete_settled(id, result);
            (true, Vec::new())
        }
        Msg::RandomClicked(kind) => (false, vec![Effect::FetchRandom { kind }]),
        Msg::RandomSettled { kind, result } => {
            state.board_mut(kind).random_settled(result);
            (true, Vec::new())
        }
        Msg::RandomClosed(kind) => (state.board_mut(kind).close_random(), Vec::new()),
        Msg::AlertDismissed(kind) => (state.board_mut(kind).dismiss_alert(), Vec::new()),
        Msg::Tick | Msg::NoOp => (false, Vec::new()),
    };

    if changed {
        state.mark_dirty();
    }
    (state, effects)
}

fn with_effects(effects: Option<Vec<Effect>>) -> (bool, Vec<Effect>) {
    match effects {
        Some(effects) => (true, effects),
        None => (false, Vec::new()),
    }
}

use std::sync::Once;

use homenet_core::{
    update, AppState, BoardSnapshot, Card, DeleteFailure, Effect, EntityForm, EntityKind,
    FormMode, Msg,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn card(id: u64, title: &str) -> Card {
    Card {
        id,
        title: title.to_string(),
        year: Some(1999),
        genre: "Sci-Fi".to_string(),
        streaming: "Netflix".to_string(),
        flag: true,
        ..Card::default()
    }
}

fn loaded(kind: EntityKind, titles: &[&str]) -> AppState {
    let cards = titles
        .iter()
        .enumerate()
        .map(|(idx, title)| card(idx as u64 + 1, title))
        .collect::<Vec<_>>();
    let count_text = format!("{} {}s in your list", cards.len(), kind);
    let (state, _) = update(
        AppState::new(),
        Msg::BoardLoaded {
            kind,
            snapshot: BoardSnapshot {
                cards,
                count_text: Some(count_text),
            },
        },
    );
    state
}

fn delete(state: AppState, kind: EntityKind, id: u64) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::DeleteClicked { kind, id });
    update(state, Msg::DeleteConfirmed(kind))
}

#[test]
fn confirmed_delete_decrements_count_and_removes_one_card() {
    init_logging();
    let state = loaded(EntityKind::Movie, &["Alien", "Heat", "Ran"]);
    assert_eq!(state.view().movies.count_text, "3 movies in your list");

    let (state, effects) = delete(state, EntityKind::Movie, 2);
    assert_eq!(
        effects,
        vec![Effect::DeleteEntity {
            kind: EntityKind::Movie,
            id: 2
        }]
    );

    let (state, _) = update(
        state,
        Msg::DeleteSettled {
            kind: EntityKind::Movie,
            id: 2,
            result: Ok(()),
        },
    );
    let view = state.view().movies;
    assert_eq!(view.count_text, "2 movies in your list");
    let titles: Vec<_> = view.cards.iter().map(|card| card.title.as_str()).collect();
    assert_eq!(titles, vec!["Alien", "Ran"]);
    assert!(view.empty_state_html.is_none());
    assert!(view.confirm_prompt.is_none());
}

#[test]
fn count_comes_from_label_not_card_list() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::BoardLoaded {
            kind: EntityKind::Movie,
            snapshot: BoardSnapshot {
                cards: vec![card(1, "Alien"), card(2, "Heat")],
                count_text: Some("7 movies in your list".to_string()),
            },
        },
    );
    let (state, _) = delete(state, EntityKind::Movie, 1);
    let (state, _) = update(
        state,
        Msg::DeleteSettled {
            kind: EntityKind::Movie,
            id: 1,
            result: Ok(()),
        },
    );
    assert_eq!(state.view().movies.count_text, "6 movies in your list");
}

#[test]
fn deleting_last_card_shows_empty_state() {
    init_logging();
    let state = loaded(EntityKind::TvShow, &["Severance"]);
    let (state, _) = delete(state, EntityKind::TvShow, 1);
    let (state, _) = update(
        state,
        Msg::DeleteSettled {
            kind: EntityKind::TvShow,
            id: 1,
            result: Ok(()),
        },
    );

    let view = state.view().tvshows;
    assert_eq!(view.count_text, "0 tvshows in your list");
    assert!(view.cards.is_empty());
    assert!(view
        .empty_state_html
        .as_deref()
        .unwrap_or_default()
        .contains("No tvshows added yet. Add your first tvshow above!"));
}

#[test]
fn delete_needs_confirmation() {
    init_logging();
    let state = loaded(EntityKind::Movie, &["Alien"]);
    let (state, effects) = update(
        state,
        Msg::DeleteClicked {
            kind: EntityKind::Movie,
            id: 1,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().movies.confirm_prompt.as_deref(),
        Some("Are you sure you want to delete this movie?")
    );

    let (state, effects) = update(state, Msg::DeleteDeclined(EntityKind::Movie));
    assert!(effects.is_empty());
    assert!(state.view().movies.confirm_prompt.is_none());
    assert_eq!(state.view().movies.cards.len(), 1);

    let (_state, effects) = update(state, Msg::DeleteConfirmed(EntityKind::Movie));
    assert!(effects.is_empty());
}

#[test]
fn delete_failures_raise_alerts() {
    init_logging();
    let state = loaded(EntityKind::Movie, &["Alien", "Heat"]);
    let (state, _) = delete(state, EntityKind::Movie, 1);
    let (state, _) = update(
        state,
        Msg::DeleteSettled {
            kind: EntityKind::Movie,
            id: 1,
            result: Err(DeleteFailure::Status(500)),
        },
    );
    let view = state.view().movies;
    assert_eq!(view.alert.as_deref(), Some("Failed to delete movie"));
    assert_eq!(view.cards.len(), 2);
    assert_eq!(view.count_text, "2 movies in your list");

    let (state, _) = update(state, Msg::AlertDismissed(EntityKind::Movie));
    let (state, _) = delete(state, EntityKind::Movie, 1);
    let (state, _) = update(
        state,
        Msg::DeleteSettled {
            kind: EntityKind::Movie,
            id: 1,
            result: Err(DeleteFailure::Transport("connection refused".to_string())),
        },
    );
    assert_eq!(
        state.view().movies.alert.as_deref(),
        Some("Failed to delete movie: connection refused")
    );
}

#[test]
fn random_pick_shows_modal_on_success_and_failure() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RandomClicked(EntityKind::Movie));
    assert_eq!(
        effects,
        vec![Effect::FetchRandom {
            kind: EntityKind::Movie
        }]
    );

    let (state, _) = update(
        state,
        Msg::RandomSettled {
            kind: EntityKind::Movie,
            result: Ok("<h4>Heat</h4>".to_string()),
        },
    );
    assert!(state.view().movies.random_modal_visible);
    assert_eq!(state.view().movies.random_modal_html, "<h4>Heat</h4>");

    let (state, _) = update(state, Msg::RandomClosed(EntityKind::Movie));
    assert!(!state.view().movies.random_modal_visible);

    let (state, _) = update(
        state,
        Msg::RandomSettled {
            kind: EntityKind::Movie,
            result: Err("dns error".to_string()),
        },
    );
    let view = state.view().movies;
    assert!(view.random_modal_visible);
    assert_eq!(
        view.random_modal_html,
        r#"<div class="text-center text-red-400">Failed to fetch a random movie.</div>"#
    );
}

#[test]
fn add_form_toggle_updates_text_and_clears_draft() {
    init_logging();
    let kind = EntityKind::TvShow;
    let view = AppState::new().view();
    assert_eq!(view.tvshows.toggle_text, "Add New Tvshow");

    let (state, _) = update(AppState::new(), Msg::ToggleAddFormClicked(kind));
    assert!(state.view().tvshows.add_form_visible);
    assert_eq!(state.view().tvshows.toggle_text, "Hide Form");
    assert_eq!(state.view().tvshows.toggle_classes, "bg-gray-600 hover:bg-gray-700");

    let draft = EntityForm {
        title: "Andor".to_string(),
        ..EntityForm::default()
    };
    let (state, _) = update(
        state,
        Msg::AddDraftChanged {
            kind,
            form: draft.clone(),
        },
    );
    assert_eq!(state.view().tvshows.add_draft, draft);

    let (state, _) = update(state, Msg::ToggleAddFormClicked(kind));
    let view = state.view().tvshows;
    assert!(!view.add_form_visible);
    assert_eq!(view.add_draft, EntityForm::default());
    assert_eq!(view.toggle_classes, "bg-blue-600 hover:bg-blue-700");
}

#[test]
fn add_submission_requires_title() {
    init_logging();
    let kind = EntityKind::Movie;
    let (state, _) = update(
        AppState::new(),
        Msg::AddDraftChanged {
            kind,
            form: EntityForm {
                title: "   ".to_string(),
                ..EntityForm::default()
            },
        },
    );
    let (state, effects) = update(state, Msg::AddFormSubmitted(kind));
    assert!(effects.is_empty());

    let form = EntityForm {
        title: "Heat".to_string(),
        year: "1995".to_string(),
        ..EntityForm::default()
    };
    let (state, _) = update(
        state,
        Msg::AddDraftChanged {
            kind,
            form: form.clone(),
        },
    );
    let (state, effects) = update(state, Msg::AddFormSubmitted(kind));
    assert_eq!(
        effects,
        vec![Effect::SubmitEntityForm {
            kind,
            mode: FormMode::Add,
            form,
        }]
    );

    let (state, _) = update(
        state,
        Msg::FormSettled {
            kind,
            mode: FormMode::Add,
            result: Ok(BoardSnapshot {
                cards: vec![card(9, "Heat")],
                count_text: Some("1 movies in your list".to_string()),
            }),
        },
    );
    let view = state.view().movies;
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.count_text, "1 movies in your list");
    assert_eq!(view.add_draft, EntityForm::default());
}

#[test]
fn edit_modal_is_populated_from_card_and_keeps_id() {
    init_logging();
    let kind = EntityKind::Movie;
    let state = loaded(kind, &["Alien", "Heat"]);

    let (state, _) = update(state, Msg::EditClicked { kind, id: 2 });
    let modal = state.view().movies.edit_modal.expect("modal open");
    assert_eq!(modal.flag_field, "available_now");
    assert_eq!(modal.form.id, Some(2));
    assert_eq!(modal.form.title, "Heat");
    assert_eq!(modal.form.year, "1999");
    assert_eq!(modal.form.notes, "");
    assert!(modal.form.flag);

    let edited = EntityForm {
        id: Some(99),
        title: "Heat (1995)".to_string(),
        ..modal.form.clone()
    };
    let (state, _) = update(state, Msg::EditDraftChanged { kind, form: edited });
    let (state, effects) = update(state, Msg::EditFormSubmitted(kind));
    match effects.as_slice() {
        [Effect::SubmitEntityForm { mode, form, .. }] => {
            assert_eq!(*mode, FormMode::Edit);
            assert_eq!(form.id, Some(2));
            assert_eq!(form.title, "Heat (1995)");
        }
        other => panic!("unexpected effects: {other:?}"),
    }

    let (state, _) = update(
        state,
        Msg::FormSettled {
            kind,
            mode: FormMode::Edit,
            result: Err("http status 400".to_string()),
        },
    );
    assert_eq!(
        state.view().movies.alert.as_deref(),
        Some("Failed to update movie: http status 400")
    );
    assert!(state.view().movies.edit_modal.is_some());

    let (state, _) = update(state, Msg::EditClosed(kind));
    assert!(state.view().movies.edit_modal.is_none());
}

#[test]
fn unknown_card_ids_are_ignored() {
    init_logging();
    let state = loaded(EntityKind::Movie, &["Alien"]);
    let (mut state, _) = update(state, Msg::NoOp);
    state.consume_dirty();

    let (mut state, effects) = update(
        state,
        Msg::DeleteClicked {
            kind: EntityKind::Movie,
            id: 42,
        },
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    let (mut state, _) = update(
        state,
        Msg::EditClicked {
            kind: EntityKind::Movie,
            id: 42,
        },
    );
    assert!(!state.consume_dirty());
}

#[test]
fn load_board_request_emits_effect() {
    let (_state, effects) = update(AppState::new(), Msg::LoadBoardRequested(EntityKind::TvShow));
    assert_eq!(
        effects,
        vec![Effect::LoadBoard {
            kind: EntityKind::TvShow
        }]
    );
}

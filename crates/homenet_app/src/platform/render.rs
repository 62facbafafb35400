//! Terminal rendering of the view model. HTML fragments are shown as
//! Markdown-flavoured text.

use homenet_core::{BoardViewModel, Card, ChatViewModel, EntityKind, EntryRole};

/// HTML fragment as terminal text.
pub fn html_to_text(html: &str) -> String {
    html2md::parse_html(html).trim().to_string()
}

/// Prints transcript entries once each, in order.
///
/// A pending answer holds back everything after it until it settles; only one
/// request is ever in flight, so that is always the last entry.
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    printed: usize,
    waiting_shown: bool,
}

impl TranscriptPrinter {
    pub fn render(&mut self, view: &ChatViewModel) -> Vec<String> {
        let mut lines = Vec::new();
        if view.entries.len() < self.printed {
            lines.push("(chat cleared)".to_string());
            self.printed = 0;
            self.waiting_shown = false;
        }

        for entry in &view.entries[self.printed..] {
            if entry.pending {
                if view.loading_visible && !self.waiting_shown {
                    lines.push("AI: thinking... (/stop to cancel)".to_string());
                    self.waiting_shown = true;
                }
                break;
            }
            let text = html_to_text(&entry.content_html);
            lines.push(match entry.role {
                EntryRole::Notice => text,
                EntryRole::User => format!("You: {text}"),
                EntryRole::Assistant => format!("AI: {text}"),
            });
            self.printed += 1;
            self.waiting_shown = false;
        }
        lines
    }
}

fn flag_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Movie => "Available Now",
        EntityKind::TvShow => "Active Season",
    }
}

pub fn render_card(kind: EntityKind, card: &Card) -> String {
    let mut line = format!("[{}] {}", card.id, card.title);
    if let Some(year) = card.year {
        line.push_str(&format!(" ({year})"));
    }
    for tag in [&card.genre, &card.streaming] {
        if !tag.is_empty() {
            line.push_str(&format!(" | {tag}"));
        }
    }
    if card.flag {
        line.push_str(&format!(" | {}", flag_label(kind)));
    }
    if !card.imdb_link.is_empty() {
        line.push_str(&format!("\n    IMDB: {}", card.imdb_link));
    }
    if !card.notes.is_empty() {
        line.push_str(&format!("\n    {}", card.notes));
    }
    line
}

pub fn render_board(view: &BoardViewModel) -> Vec<String> {
    let mut lines = vec![view.count_text.clone()];
    match &view.empty_state_html {
        Some(html) => lines.push(html_to_text(html)),
        None => lines.extend(view.cards.iter().map(|card| render_card(view.kind, card))),
    }
    lines
}

/// The random-pick modal's content, when it is showing.
pub fn render_random(view: &BoardViewModel) -> Option<String> {
    view.random_modal_visible
        .then(|| html_to_text(&view.random_modal_html))
}

#[cfg(test)]
mod tests {
    use homenet_core::{update, AppState, BoardSnapshot, Card, EntityKind, Msg, QueryOutcome};
    use pretty_assertions::assert_eq;

    use super::{render_board, render_card, TranscriptPrinter};

    #[test]
    fn transcript_entries_print_once_and_pending_waits() {
        let mut printer = TranscriptPrinter::default();
        let state = AppState::new();
        let welcome = printer.render(&state.view().chat);
        assert_eq!(welcome.len(), 1);
        assert!(welcome[0].starts_with("Welcome"));

        let (state, _) = update(state, Msg::InputChanged("hello".to_string()));
        let (state, _) = update(state, Msg::SubmitClicked { submitted_at_ms: 1 });
        assert_eq!(
            printer.render(&state.view().chat),
            vec![
                "You: hello".to_string(),
                "AI: thinking... (/stop to cancel)".to_string()
            ]
        );
        assert!(printer.render(&state.view().chat).is_empty());

        let (state, _) = update(
            state,
            Msg::QuerySettled {
                request_id: 1,
                outcome: QueryOutcome::Answered("hi there".to_string()),
            },
        );
        assert_eq!(
            printer.render(&state.view().chat),
            vec!["AI: hi there".to_string()]
        );

        let (state, _) = update(state, Msg::ClearChatClicked);
        let lines = printer.render(&state.view().chat);
        assert_eq!(lines[0], "(chat cleared)");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn card_line_lists_present_fields_only() {
        let card = Card {
            id: 3,
            title: "Heat".to_string(),
            year: Some(1995),
            streaming: "Netflix".to_string(),
            flag: true,
            ..Card::default()
        };
        assert_eq!(
            render_card(EntityKind::Movie, &card),
            "[3] Heat (1995) | Netflix | Available Now"
        );
    }

    #[test]
    fn empty_board_shows_empty_state_text() {
        let (state, _) = update(
            AppState::new(),
            Msg::BoardLoaded {
                kind: EntityKind::TvShow,
                snapshot: BoardSnapshot {
                    cards: Vec::new(),
                    count_text: Some("0 tvshows in your list".to_string()),
                },
            },
        );
        let lines = render_board(&state.view().tvshows);
        assert_eq!(lines[0], "0 tvshows in your list");
        assert!(lines[1].contains("No tvshows added yet."));
    }
}

use engine_logging::{engine_debug, engine_warn};
use scraper::{ElementRef, Html, Selector};

use crate::{BoardPage, CardRecord, EntityKind};

/// Reads cards and the count label out of board markup.
///
/// Works on the full board page as well as on the card-list fragment that
/// add and edit return. Cards are the `div.bg-gray-700` blocks; their data
/// comes from the edit button's `data-{kind}-*` attributes. Blocks without an
/// edit button are skipped.
pub fn parse_board_html(kind: EntityKind, html: &str) -> BoardPage {
    let doc = Html::parse_document(html);
    let slug = kind.slug();
    let card_sel = Selector::parse("div.bg-gray-700").ok();
    let edit_sel = Selector::parse(&format!("button[data-{slug}-title]")).ok();
    let count_sel = Selector::parse(&format!("#{slug}-count")).ok();

    let cards = match (card_sel.as_ref(), edit_sel.as_ref()) {
        (Some(card_sel), Some(edit_sel)) => doc
            .select(card_sel)
            .filter_map(|card| card.select(edit_sel).next())
            .filter_map(|button| read_card(kind, button))
            .collect(),
        _ => Vec::new(),
    };

    let count_text = count_sel
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .map(|node| collapse_whitespace(&node.text().collect::<String>()))
        .filter(|text| !text.is_empty());

    engine_debug!(
        "Parsed {} {} cards, count label {:?}",
        cards.len(),
        kind,
        count_text
    );
    BoardPage { cards, count_text }
}

fn read_card(kind: EntityKind, button: ElementRef<'_>) -> Option<CardRecord> {
    let slug = kind.slug();
    let attr = |name: &str| {
        button
            .value()
            .attr(&format!("data-{slug}-{name}"))
            .unwrap_or_default()
            .to_string()
    };

    let id = match attr("id").trim().parse::<u64>() {
        Ok(id) => id,
        Err(_) => {
            engine_warn!("Skipping {} card without a numeric id", kind);
            return None;
        }
    };
    let year = attr("year").trim().parse::<u32>().ok().filter(|year| *year > 0);
    let flag_attr = kind.flag_field().replace('_', "-");

    Some(CardRecord {
        id,
        title: attr("title"),
        year,
        genre: attr("genre"),
        streaming: attr("streaming"),
        notes: attr("notes"),
        imdb_link: attr("imdb"),
        flag: attr(flag_attr.as_str()) == "true",
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

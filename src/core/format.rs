use crate::domain::model::{Category, Deck};
use std::fmt::Write;

/// Deck title as printed on the first line and used for the filename:
/// uppercase theme, apostrophes removed ("N'er-do-wells" -> "NER-DO-WELLS"),
/// ` (n)` suffix only for multi-variant themes.
pub fn deck_title(deck: &Deck) -> String {
    let mut title = deck.theme.to_uppercase().replace('\'', "");
    if let Some(n) = deck.variant {
        let _ = write!(title, " ({})", n);
    }
    title
}

pub fn deck_filename(deck: &Deck) -> String {
    format!("{}.txt", deck_title(deck))
}

/// Render the standard deck layout: title line, then each non-empty
/// category in the fixed order as a `//Category (count)` header followed by
/// `quantity name` lines in source order.
pub fn format_deck(deck: &Deck) -> String {
    let mut out = String::new();
    out.push_str(&deck_title(deck));
    out.push('\n');

    for category in Category::OUTPUT_ORDER {
        let group: Vec<_> = deck
            .cards
            .iter()
            .filter(|(_, c)| *c == category)
            .map(|(card, _)| card)
            .collect();
        if group.is_empty() {
            continue;
        }

        let total: u32 = group.iter().map(|card| card.quantity).sum();
        let _ = writeln!(out, "//{} ({})", category, total);
        for card in group {
            let _ = writeln!(out, "{} {}", card.quantity, card.name);
        }
    }
    out
}

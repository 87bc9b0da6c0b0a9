use crate::core::normalize::is_theme_description;
use crate::domain::model::{Dialect, RawDeck};
use crate::utils::error::{EtlError, Result};
use regex::Regex;

/// Parse one announcement page in the given dialect. Zero matching deck
/// blocks means the wrong dialect was chosen for this file; that is a
/// whole-file error, not an empty result.
pub fn extract(dialect: Dialect, html: &str) -> Result<Vec<RawDeck>> {
    let decks = match dialect {
        Dialect::Tagged => extract_tagged(html),
        Dialect::HeadingList => extract_heading_list(html),
        Dialect::Legacy => extract_legacy(html),
        Dialect::TutorialTable => extract_tutorial_table(html),
    };

    if decks.is_empty() {
        return Err(EtlError::ExtractError {
            message: format!(
                "no {:?} deck blocks found; wrong dialect for this file?",
                dialect
            ),
        });
    }
    Ok(decks)
}

/// `<deck-list deck-title="...">` with card lines inside `<main-deck>`,
/// one per line. Used by J25, ONE, MOM, LTR style pages.
fn extract_tagged(html: &str) -> Vec<RawDeck> {
    let deck_re =
        Regex::new(r#"(?s)<deck-list[^>]*deck-title="([^"]+)"[^>]*>(.*?)</deck-list>"#).unwrap();
    let main_re = Regex::new(r"(?s)<main-deck>(.*?)</main-deck>").unwrap();

    let mut decks = Vec::new();
    for captures in deck_re.captures_iter(html) {
        let title = captures[1].trim().to_string();
        let Some(main) = main_re.captures(&captures[2]) else {
            continue;
        };
        let lines = card_lines(main[1].lines());
        decks.push(raw_deck(&title, lines));
    }
    decks
}

/// `<h2>Theme</h2>` followed by a `<ul>` whose `<li>` items are card lines.
/// Used by DMU and BRO style pages. Headings number variants with a bare
/// trailing integer ("Infantry 1").
fn extract_heading_list(html: &str) -> Vec<RawDeck> {
    let deck_re = Regex::new(r"(?s)<h2>([^<]+)</h2>\s*<ul>(.*?)</ul>").unwrap();
    let item_re = Regex::new(r"<li>([^<]+)</li>").unwrap();

    let mut decks = Vec::new();
    for captures in deck_re.captures_iter(html) {
        let title = captures[1].trim().to_string();
        let items = &captures[2];
        let lines = card_lines(
            item_re
                .captures_iter(items)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str()),
        );
        decks.push(raw_deck_numbered(&title, lines));
    }
    decks
}

/// `<deck-list><legacy>` blocks: a `Title:` line names the theme, `Format:`
/// metadata lines are skipped, everything else is a card line. Used by the
/// original JMP page.
fn extract_legacy(html: &str) -> Vec<RawDeck> {
    let block_re = Regex::new(r"(?s)<deck-list><legacy>(.*?)</legacy></deck-list>").unwrap();
    let title_re = Regex::new(r"Title:\s*(.+)").unwrap();

    let mut decks = Vec::new();
    for captures in block_re.captures_iter(html) {
        let block = &captures[1];
        let Some(title) = title_re.captures(block) else {
            continue;
        };
        let title = title[1].trim().to_string();
        let lines = card_lines(
            block
                .lines()
                .filter(|line| {
                    let line = line.trim();
                    !line.starts_with("Title:") && !line.starts_with("Format:")
                }),
        );
        decks.push(raw_deck(&title, lines));
    }
    decks
}

/// Tutorial decks are printed as an ordered draw table of `<auto-card>`
/// rows, one row per physical card. Quantities are recovered by counting
/// repeats; first-appearance order is kept.
fn extract_tutorial_table(html: &str) -> Vec<RawDeck> {
    let table_re = Regex::new(r"(?s)<table[^>]*>(.*?)</table>").unwrap();
    let title_re = Regex::new(r"<div[^>]*>([^<>]+)</div>").unwrap();
    let card_re = Regex::new(r"<auto-card[^>]*>([^<]+)</auto-card>").unwrap();

    let mut decks = Vec::new();
    for table in table_re.captures_iter(html) {
        let table_match = table.get(0).unwrap();

        // the deck title is the nearest <div> heading above the table
        let preceding = &html[..table_match.start()];
        let Some(title) = title_re
            .captures_iter(preceding)
            .last()
            .map(|c| c[1].trim().to_string())
        else {
            continue;
        };

        let mut counts: Vec<(String, u32)> = Vec::new();
        for row in card_re.captures_iter(&table[1]) {
            let name = row[1].trim().to_string();
            match counts.iter_mut().find(|(seen, _)| *seen == name) {
                Some((_, count)) => *count += 1,
                None => counts.push((name, 1)),
            }
        }
        if counts.is_empty() {
            continue;
        }

        let lines = counts
            .into_iter()
            .map(|(name, count)| format!("{} {}", count, name))
            .collect();
        decks.push(raw_deck(&title, lines));
    }
    decks
}

fn card_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_theme_description(line))
        .map(str::to_string)
        .collect()
}

/// Split a trailing ` (n)` variant marker off a source title. Titles
/// without one are single-variant themes and carry no suffix.
fn raw_deck(title: &str, lines: Vec<String>) -> RawDeck {
    let variant_re = Regex::new(r"^(.*?)\s*\((\d+)\)$").unwrap();
    match variant_re.captures(title) {
        Some(captures) => RawDeck {
            theme: captures[1].to_string(),
            variant: captures[2].parse().ok(),
            lines,
        },
        None => RawDeck {
            theme: title.to_string(),
            variant: None,
            lines,
        },
    }
}

/// Heading-list titles number variants with a bare integer suffix
/// ("Infantry 1") instead of parentheses.
fn raw_deck_numbered(title: &str, lines: Vec<String>) -> RawDeck {
    let numbered_re = Regex::new(r"^(.*\S)\s+(\d+)$").unwrap();
    match numbered_re.captures(title) {
        Some(captures) => RawDeck {
            theme: captures[1].to_string(),
            variant: captures[2].parse().ok(),
            lines,
        },
        None => raw_deck(title, lines),
    }
}

use crate::domain::model::NormalizedCard;
use crate::utils::error::{EtlError, Result};
use regex::Regex;

pub const BASIC_LANDS: [&str; 5] = ["Plains", "Island", "Swamp", "Mountain", "Forest"];

/// Decorative printing prefixes that are not part of the card name.
const DECORATIVE_PREFIXES: [&str; 2] = ["Full-art stained-glass ", "Traditional foil "];

/// Real multi-word lands that happen to end in a basic land word and must
/// never be collapsed: the ABU duals plus the JumpStart Thriving cycle.
const VERBATIM_LANDS: [&str; 15] = [
    "Tropical Island",
    "Volcanic Island",
    "Underground Sea",
    "Badlands",
    "Bayou",
    "Plateau",
    "Savannah",
    "Scrubland",
    "Taiga",
    "Tundra",
    "Thriving Isle",
    "Thriving Heath",
    "Thriving Bluff",
    "Thriving Moor",
    "Thriving Grove",
];

/// Real cards whose names start with a basic land word. The leading-word
/// collapse must leave these alone.
const VERBATIM_BASIC_PREFIXED: [&str; 11] = [
    "Mountain Goat",
    "Mountain Yeti",
    "Mountain Titan",
    "Mountain Stronghold",
    "Mountain Bandit",
    "Mountain Valley",
    "Island Fish Jasconius",
    "Island Sanctuary",
    "Island of Wak-Wak",
    "Forest Bear",
    "Swamp Mosquito",
];

/// Clean one raw card line into quantity + canonical name.
///
/// Order matters: bracketed collector IDs first, then decorative prefixes,
/// then the leading quantity, then flavor-named basic land collapse.
/// A line with no card name left after stripping is an error for that line
/// only; callers skip it and keep going.
pub fn normalize(raw_line: &str) -> Result<NormalizedCard> {
    let id_suffix = Regex::new(r"\s+\[[A-Za-z0-9]+\]").unwrap();
    let mut line = id_suffix.replace_all(raw_line.trim(), "").trim().to_string();

    for prefix in DECORATIVE_PREFIXES {
        line = line.replace(prefix, "");
    }

    let (quantity, name) = match line.split_once(char::is_whitespace) {
        Some((first, rest)) => match first.parse::<u32>() {
            Ok(quantity) => (quantity, rest.trim().to_string()),
            Err(_) => (1, line.clone()),
        },
        None => (1, line.clone()),
    };

    if name.is_empty() {
        return Err(EtlError::ProcessingError {
            message: format!("no card name in line {:?}", raw_line),
        });
    }
    if quantity == 0 {
        return Err(EtlError::ProcessingError {
            message: format!("zero quantity in line {:?}", raw_line),
        });
    }

    Ok(NormalizedCard {
        quantity,
        name: collapse_basic_land(&name),
    })
}

/// Collapse flavor-named basic land variants to the bare basic land. The
/// flavor words can sit before the basic word ("Above the Clouds Island")
/// or after it ("Plains Appa"). Real special lands and Snow-Covered basics
/// are preserved verbatim.
fn collapse_basic_land(name: &str) -> String {
    if BASIC_LANDS.contains(&name)
        || VERBATIM_LANDS.contains(&name)
        || VERBATIM_BASIC_PREFIXED.contains(&name)
    {
        return name.to_string();
    }

    if let Some(rest) = name.strip_prefix("Snow-Covered ") {
        if BASIC_LANDS.contains(&rest) {
            return name.to_string();
        }
    }

    for basic in BASIC_LANDS {
        if let Some(stripped) = name.strip_suffix(basic) {
            if stripped.ends_with(' ') {
                return basic.to_string();
            }
        }
        if let Some(stripped) = name.strip_prefix(basic) {
            if stripped.starts_with(' ') {
                return basic.to_string();
            }
        }
    }

    name.to_string()
}

/// Rows like "1 Theme description card" describe the insert card, not a
/// playable card, and are dropped during extraction.
pub fn is_theme_description(line: &str) -> bool {
    line.to_lowercase().contains("theme description card")
}

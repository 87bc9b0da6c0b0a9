use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse card-type bucket used for grouping deck output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Creatures,
    Sorceries,
    Instants,
    Artifacts,
    Enchantments,
    Lands,
    Planeswalkers,
    Special,
    Unknown,
}

impl Category {
    /// Fixed rendering order for deck files. Special and Unknown always last.
    pub const OUTPUT_ORDER: [Category; 9] = [
        Category::Creatures,
        Category::Sorceries,
        Category::Instants,
        Category::Artifacts,
        Category::Enchantments,
        Category::Lands,
        Category::Planeswalkers,
        Category::Special,
        Category::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Creatures => "Creatures",
            Category::Sorceries => "Sorceries",
            Category::Instants => "Instants",
            Category::Artifacts => "Artifacts",
            Category::Enchantments => "Enchantments",
            Category::Lands => "Lands",
            Category::Planeswalkers => "Planeswalkers",
            Category::Special => "Special",
            Category::Unknown => "Unknown",
        }
    }

    pub fn parse(label: &str) -> Option<Category> {
        match label {
            "Creatures" => Some(Category::Creatures),
            "Sorceries" => Some(Category::Sorceries),
            "Instants" => Some(Category::Instants),
            "Artifacts" => Some(Category::Artifacts),
            "Enchantments" => Some(Category::Enchantments),
            "Lands" => Some(Category::Lands),
            "Planeswalkers" => Some(Category::Planeswalkers),
            "Special" => Some(Category::Special),
            "Unknown" => Some(Category::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTML layout of a source announcement page. The caller picks the dialect;
/// a mismatch is a whole-file error, not partial data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// `<deck-list deck-title="...">` blocks with `<main-deck>` card lines.
    Tagged,
    /// `<h2>` theme headings followed by `<ul><li>` card lines.
    HeadingList,
    /// `<deck-list><legacy>` blocks with Title:/Format: metadata lines.
    Legacy,
    /// Draw-order tables of `<auto-card>` rows; quantities are counted.
    TutorialTable,
}

/// A cleaned card entry: quantity plus canonical name, no bracketed IDs,
/// no decorative land-art prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCard {
    pub quantity: u32,
    pub name: String,
}

/// One deck block as lifted from the HTML, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeck {
    pub theme: String,
    pub variant: Option<u32>,
    pub lines: Vec<String>,
}

/// A fully classified deck, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub theme: String,
    pub variant: Option<u32>,
    pub cards: Vec<(NormalizedCard, Category)>,
}

/// A named release: all decks scraped from one announcement page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSet {
    pub name: String,
    pub decks: Vec<Deck>,
}

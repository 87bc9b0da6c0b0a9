pub mod cache;
pub mod classify;
pub mod etl;
pub mod extract;
pub mod format;
pub mod normalize;
pub mod pipeline;

pub use crate::domain::model::{Category, Deck, Dialect, NormalizedCard, RawDeck, ThemeSet};
pub use crate::domain::ports::{CardLookup, ConfigProvider, Pipeline, RequestGate, Storage};
pub use crate::utils::error::Result;

use crate::domain::model::{Dialect, RawDeck, ThemeSet};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Sink for rendered deck files, rooted at the output directory. Input
/// pages are read from independent paths and never go through here.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_files(&self) -> &[String];
    fn dialect(&self) -> Dialect;
    fn output_path(&self) -> &str;
    fn cache_file(&self) -> &str;
    fn api_endpoint(&self) -> &str;
    fn request_interval_ms(&self) -> u64;
    fn set_name(&self) -> Option<&str>;
    fn offline(&self) -> bool;
    fn dry_run(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawDeck>>;
    async fn transform(&self, decks: Vec<RawDeck>) -> Result<ThemeSet>;
    async fn load(&self, set: ThemeSet) -> Result<String>;
}

/// Exact-name query against the external card database. Absence of a card
/// is a normal outcome, not an error.
#[async_trait]
pub trait CardLookup: Send + Sync {
    async fn type_line(&self, name: &str) -> Result<Option<String>>;
}

#[async_trait]
impl<L: CardLookup + ?Sized> CardLookup for Box<L> {
    async fn type_line(&self, name: &str) -> Result<Option<String>> {
        (**self).type_line(name).await
    }
}

/// Gate acquired before every external query. Enforces the remote
/// service's minimum inter-request interval; injectable so tests never
/// sleep for real.
#[async_trait]
pub trait RequestGate: Send + Sync {
    async fn acquire(&mut self);
}

//! Browser port - fire-and-forget tab opening.

/// Opens URLs in the user's browser.
pub trait BrowserOpener: Send + Sync {
    fn open_tab(&self, url: &str) -> anyhow::Result<()>;
}

//! Browser adapter using the platform opener.

use anyhow::Context;

use crate::domain::ports::BrowserOpener;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl SystemBrowser {
    pub fn new() -> Self {
        Self
    }
}

impl BrowserOpener for SystemBrowser {
    fn open_tab(&self, url: &str) -> anyhow::Result<()> {
        open::that_detached(url).with_context(|| format!("Failed to open browser at {url}"))
    }
}

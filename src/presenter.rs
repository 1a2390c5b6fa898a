//! Maps search results to list entries and the action they expose.

use crate::controller::SearchResultItem;
use anyhow::{Context, Result};

pub const SECTION_TITLE: &str = "Results";
pub const OPEN_IN_BROWSER_TITLE: &str = "Open in Browser";

/// Something that can show a URL to the user
pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the platform's default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        tracing::info!(url = %url, "opening in browser");
        open::that(url).with_context(|| format!("Failed to open {url}"))
    }
}

/// The action attached to a list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenInBrowser<'a> {
    pub title: &'static str,
    pub url: &'a str,
}

impl OpenInBrowser<'_> {
    pub fn run(&self, opener: &dyn BrowserOpener) -> Result<()> {
        opener.open(self.url)
    }
}

/// Display form of one result, borrowed from the item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEntry<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub accessory_title: &'a str,
    pub action: OpenInBrowser<'a>,
}

pub fn present(item: &SearchResultItem) -> ListEntry<'_> {
    ListEntry {
        title: item.title(),
        subtitle: item.overview(),
        accessory_title: item.title(),
        action: OpenInBrowser {
            title: OPEN_IN_BROWSER_TITLE,
            url: item.url(),
        },
    }
}

/// Subtitle of the results section: the number of entries
pub fn section_subtitle(results: &[SearchResultItem]) -> String {
    results.len().to_string()
}

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::db::PersonRecord;
use crate::discovery::discover_with;
use crate::fetch::Fetch;
use crate::parser;
use crate::resolve::resolve;
use crate::settings::Site;

pub struct CrawlReport {
    pub pages: usize,
    pub candidates: usize,
    pub people: Vec<PersonRecord>,
}

/// Discover team pages, extract every page in order, and resolve the
/// candidates into one record per person.
///
/// A page that cannot be fetched aborts the run; only the root page used for
/// discovery may fail.
pub fn collect_people(
    fetcher: &dyn Fetch,
    site: &Site,
    seeds: &[String],
    pb: &ProgressBar,
) -> Result<CrawlReport> {
    let pages = discover_with(fetcher, &site.team_root, seeds);
    if pages.is_empty() {
        warn!("No team pages to scan");
    }
    info!(pages = pages.len(), "Scanning team pages");
    pb.set_length(pages.len() as u64);

    let mut candidates = Vec::new();
    for page in &pages {
        let html = fetcher
            .fetch(page)
            .with_context(|| format!("Failed to fetch team page {}", page))?;
        let found = parser::extract(&html, page, site);
        info!(page = %page, found = found.len(), "Extracted candidates");
        candidates.extend(found);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let candidate_count = candidates.len();
    let people = resolve(candidates, site);
    info!(candidates = candidate_count, people = people.len(), "Resolution complete");

    Ok(CrawlReport {
        pages: pages.len(),
        candidates: candidate_count,
        people,
    })
}

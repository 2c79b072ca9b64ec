use std::collections::HashSet;

use tracing::{info, warn};
use url::Url;

use crate::fetch::Fetch;
use crate::parser::elements::{flatten, Tag};
use crate::parser::links::{absolutize, canonical_page, is_mailto};

/// Pages linked from the root document that live under the root directory,
/// followed by the static seeds. Order-preserving and deduplicated.
pub fn discover_pages(root_html: &str, root: &Url, seeds: &[String]) -> Vec<String> {
    let prefix = canonical_page(root);
    let discovered: Vec<String> = flatten(root_html)
        .into_iter()
        .filter(|e| e.tag == Tag::Anchor)
        .filter_map(|e| e.href)
        .filter(|href| !is_mailto(href))
        .filter_map(|href| absolutize(&href, root))
        .filter(|url| url.starts_with(&prefix))
        .filter_map(|url| Url::parse(&url).ok())
        .map(|url| canonical_page(&url))
        .collect();

    info!(discovered = discovered.len(), root = %root, "Parsed root navigation");
    dedupe_preserve(discovered.into_iter().chain(seeds.iter().cloned()))
}

/// Fetch the root and discover from it. If the root cannot be fetched the
/// crawl continues on the static seeds alone.
pub fn discover_with(fetcher: &dyn Fetch, root: &Url, seeds: &[String]) -> Vec<String> {
    match fetcher.fetch(root.as_str()) {
        Ok(html) => discover_pages(&html, root, seeds),
        Err(err) => {
            warn!(root = %root, error = %err, "Root page unavailable, falling back to seed pages");
            seed_fallback(seeds)
        }
    }
}

fn seed_fallback(seeds: &[String]) -> Vec<String> {
    dedupe_preserve(seeds.iter().cloned())
}

pub fn dedupe_preserve(urls: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|u| !u.is_empty() && seen.insert(u.clone()))
        .collect()
}

use url::Url;

/// Resolve an href against the page it appeared on.
///
/// Returns `None` for fragment-only links and hrefs that cannot be resolved.
pub fn absolutize(href: &str, page: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    page.join(href).ok().map(String::from)
}

/// Drop query and fragment and force exactly one trailing slash.
pub fn canonical_page(url: &Url) -> String {
    let mut u = url.clone();
    u.set_query(None);
    u.set_fragment(None);
    let path = format!("{}/", u.path().trim_end_matches('/'));
    u.set_path(&path);
    u.to_string()
}

pub fn is_mailto(href: &str) -> bool {
    href.trim().to_ascii_lowercase().starts_with("mailto:")
}

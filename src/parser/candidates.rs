use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::elements::{Element, Tag};
use super::links::{absolutize, is_mailto};
use crate::settings::Site;
use crate::text::{clean_ws, normalize};

static NAME_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-zÀ-ÖØ-öø-ÿ][A-Za-zÀ-ÖØ-öø-ÿ'.-]*").unwrap());

/// Headings and navigation labels that pass the token count but are never people.
const STRUCTURAL_LABELS: &[&str] = &[
    "home",
    "team",
    "back to top",
    "board of directors",
    "management team",
    "research groups",
    "junior research groups",
    "junior members",
    "postdocs",
    "phd students",
    "students",
];

/// Academic titles that sit on their own line next to a name.
const TITLE_TOKENS: &[&str] = &["Prof.", "Prof", "Dr.", "Dr", "Junior", "Representative"];

const ROLE_KEYWORDS: &[&str] = &["manager", "director", "leader", "fellow", "coordinator", "official"];
const SHORT_ROLE_KEYWORDS: &[&str] = &["coordinator", "fellow", "representative"];

const WINDOW: usize = 30;
const NOTE_ANCHORS: usize = 25;
const MAX_LINE_CHARS: usize = 180;
const MAX_SHORT_LINE_TOKENS: usize = 6;
const MAX_SECTION_CHARS: usize = 30;
const DEFAULT_ROLE: &str = "Member";
const ARROW: char = '→';

/// One mention of a person on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub full_name: String,
    pub role: String,
    pub note: String,
    pub profile_url: String,
    pub source_page: String,
}

pub fn looks_like_name(text: &str) -> bool {
    let s = clean_ws(text);
    if s.chars().count() < 3 {
        return false;
    }
    let lowered = s.to_lowercase();
    if STRUCTURAL_LABELS.contains(&lowered.as_str()) {
        return false;
    }
    let tokens = NAME_TOKEN_RE.find_iter(&s).count();
    (2..=8).contains(&tokens)
}

/// Text lines and resolved links that follow a name, up to the next person.
#[derive(Debug, Default)]
struct Block {
    lines: Vec<String>,
    links: Vec<String>,
}

struct Affiliation {
    label: String,
    url: Option<String>,
}

/// Scan a flattened page for people. Never fails: elements that do not look
/// like names are skipped.
pub fn scan(elements: &[Element], page: &Url, site: &Site) -> Vec<RawCandidate> {
    let mut section = String::new();
    let mut candidates = Vec::new();

    for (idx, el) in elements.iter().enumerate() {
        if el.tag.is_section() && !el.text.is_empty() {
            section = el.text.clone();
            continue;
        }
        if !looks_like_name(&el.text) {
            continue;
        }

        let following = &elements[idx + 1..];
        let block = collect_block(following, page);
        let role = pick_role(&block.lines, &section);
        let mut profile_url = pick_profile(&block.links, site);
        let mut note = String::new();

        if let Some(affiliation) = find_affiliation(following, page) {
            note = affiliation.label;
            if let Some(url) = affiliation.url {
                profile_url = url;
            }
        }

        candidates.push(RawCandidate {
            full_name: el.text.clone(),
            role,
            note,
            profile_url,
            source_page: page.to_string(),
        });
    }

    dedupe_page(candidates)
}

/// Bounded look-ahead: at most `WINDOW` window-eligible elements, stopping at
/// the first heading that is itself a name.
fn collect_block(following: &[Element], page: &Url) -> Block {
    let mut block = Block::default();
    for el in following.iter().filter(|e| e.tag.in_window()).take(WINDOW) {
        if el.tag.breaks_block() && looks_like_name(&el.text) {
            break;
        }
        if el.tag.is_descriptive() && !el.text.is_empty() {
            block.lines.push(el.text.clone());
        }
        if el.tag == Tag::Anchor {
            let resolved = el
                .href
                .as_deref()
                .filter(|h| !is_mailto(h))
                .and_then(|h| absolutize(h, page));
            if let Some(url) = resolved {
                block.links.push(url);
            }
        }
    }
    block
}

fn pick_role(lines: &[String], section: &str) -> String {
    let from_lines = lines
        .iter()
        .filter(|t| t.chars().count() <= MAX_LINE_CHARS && !TITLE_TOKENS.contains(&t.as_str()))
        .find(|t| is_role_line(t));
    if let Some(role) = from_lines {
        return role.clone();
    }
    if !section.is_empty() && section.chars().count() <= MAX_SECTION_CHARS {
        section.to_string()
    } else {
        DEFAULT_ROLE.to_string()
    }
}

fn is_role_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    if ROLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }
    line.split_whitespace().count() <= MAX_SHORT_LINE_TOKENS
        && SHORT_ROLE_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn pick_profile(links: &[String], site: &Site) -> String {
    links
        .iter()
        .find(|u| site.is_internal(u))
        .or_else(|| links.first())
        .cloned()
        .unwrap_or_default()
}

/// First of the next `NOTE_ANCHORS` anchors that names a group affiliation.
/// Unlike the block window this does not stop at the next person.
fn find_affiliation(following: &[Element], page: &Url) -> Option<Affiliation> {
    following
        .iter()
        .filter(|e| e.tag == Tag::Anchor)
        .take(NOTE_ANCHORS)
        .find(|a| a.text.contains(ARROW) || a.text.starts_with("Group"))
        .map(|a| Affiliation {
            label: clean_ws(&a.text.replace(ARROW, "")),
            url: a.href.as_deref().and_then(|h| absolutize(h, page)),
        })
}

/// Within one page the first of several identical mentions wins.
fn dedupe_page(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| {
            seen.insert((
                normalize(&c.full_name),
                c.profile_url.to_lowercase(),
                normalize(&c.role),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::elements::flatten;
    use crate::settings::test_site;

    const PAGE: &str = "https://mcml.ai/team/management/";

    fn run(html: &str) -> Vec<RawCandidate> {
        scan(&flatten(html), &Url::parse(PAGE).unwrap(), &test_site())
    }

    fn find<'a>(cands: &'a [RawCandidate], name: &str) -> &'a RawCandidate {
        cands
            .iter()
            .find(|c| c.full_name == name)
            .unwrap_or_else(|| panic!("{} not extracted from {:?}", name, cands))
    }

    #[test]
    fn name_predicate() {
        assert!(looks_like_name("Jane Doe"));
        assert!(looks_like_name("Prof. Dr. Thomas Müller-Lüdenscheidt"));
        assert!(!looks_like_name("Jo"));
        assert!(!looks_like_name("Madonna"));
        assert!(!looks_like_name("  Management   Team "));
        assert!(!looks_like_name("Back to top"));
        assert!(!looks_like_name("one two three four five six seven eight nine"));
        assert!(looks_like_name("one two three four five six seven eight"));
        assert!(!looks_like_name("2024 2025"));
    }

    #[test]
    fn window_stops_at_next_name_heading() {
        let html = r#"
            <h3>Jane Doe</h3>
            <p>Lab Coordinator</p>
            <p>Munich</p>
            <h3>John Roe</h3>
            <p>Research Director</p>
            <a href="/team/john-roe/">Profile</a>
        "#;
        let cands = run(html);
        let jane = find(&cands, "Jane Doe");
        assert_eq!(jane.role, "Lab Coordinator");
        assert_eq!(jane.profile_url, "");
        let john = find(&cands, "John Roe");
        assert_eq!(john.role, "Research Director");
        assert_eq!(john.profile_url, "https://mcml.ai/team/john-roe/");
    }

    #[test]
    fn text_after_next_name_not_attributed() {
        let html = r#"
            <h4>Alice Example</h4>
            <span>Speaks at conferences</span>
            <span>Based in Garching</span>
            <h4>Bob Sample</h4>
            <p>Program Manager</p>
        "#;
        let cands = run(html);
        let alice = find(&cands, "Alice Example");
        assert_eq!(alice.role, "Member");
        assert!(!alice.role.contains("Manager"));
        assert_eq!(find(&cands, "Bob Sample").role, "Program Manager");
    }

    #[test]
    fn strong_outside_window_does_not_stop() {
        // strong is a name element but not part of the look-ahead window
        let html = r#"<h3>Alice Example</h3><strong>Bob Sample</strong><p>Research Fellow</p>"#;
        let cands = run(html);
        assert_eq!(find(&cands, "Alice Example").role, "Research Fellow");
    }

    #[test]
    fn section_fallback_and_default() {
        let html = r#"
            <h2>PostDocs</h2>
            <h3>Jane Doe</h3>
            <h2>Members of the extended scientific community</h2>
            <h3>John Roe</h3>
        "#;
        let cands = run(html);
        assert_eq!(find(&cands, "Jane Doe").role, "PostDocs");
        assert_eq!(find(&cands, "John Roe").role, "Member");
        // section headings are never people
        assert!(cands.iter().all(|c| c.full_name != "Members of the extended scientific community"));
    }

    #[test]
    fn first_role_line_wins_and_titles_skipped() {
        let html = r#"
            <h3>Jane Doe</h3>
            <p>Dr.</p>
            <p>Student Representative</p>
            <p>Managing Director</p>
        "#;
        assert_eq!(find(&run(html), "Jane Doe").role, "Student Representative");
    }

    #[test]
    fn long_representative_line_not_a_role() {
        let html = r#"
            <h3>Jane Doe</h3>
            <p>She is the elected representative of all doctoral researchers here</p>
        "#;
        assert_eq!(find(&run(html), "Jane Doe").role, "Member");
    }

    #[test]
    fn internal_link_preferred_over_external() {
        let html = r#"
            <h3>Jane Doe</h3>
            <a href="https://www.lmu.de/jane">Homepage</a>
            <a href="/team/jane-doe/">MCML</a>
            <a href="mailto:jane@mcml.ai">Mail</a>
        "#;
        assert_eq!(find(&run(html), "Jane Doe").profile_url, "https://mcml.ai/team/jane-doe/");
    }

    #[test]
    fn external_link_fallback() {
        let html = r#"<h3>Jane Doe</h3><a href="https://www.lmu.de/jane">Homepage</a>"#;
        assert_eq!(find(&run(html), "Jane Doe").profile_url, "https://www.lmu.de/jane");
    }

    #[test]
    fn affiliation_link_sets_note_and_overrides_profile() {
        let html = r#"
            <h3>Jane Doe</h3>
            <a href="/team/jane-doe/">Profile</a>
            <a href="/research/groups/doe/">→ Group Doe</a>
        "#;
        let cands = run(html);
        let jane = find(&cands, "Jane Doe");
        assert_eq!(jane.note, "Group Doe");
        assert_eq!(jane.profile_url, "https://mcml.ai/research/groups/doe/");
    }

    #[test]
    fn affiliation_scan_crosses_next_person() {
        let html = r#"
            <h3>Jane Doe</h3>
            <h3>John Roe</h3>
            <a href="/research/groups/roe/">Group Roe</a>
        "#;
        let cands = run(html);
        assert_eq!(find(&cands, "Jane Doe").note, "Group Roe");
        assert_eq!(find(&cands, "John Roe").note, "Group Roe");
    }

    #[test]
    fn duplicate_mentions_on_page_collapse() {
        let html = r#"
            <h3>Jane Doe</h3><p>Research Fellow</p>
            <h3>JANE  DOE</h3><p>research fellow</p>
        "#;
        let cands = run(html);
        let janes = cands.iter().filter(|c| normalize(&c.full_name) == "jane doe").count();
        assert_eq!(janes, 1);
        assert_eq!(find(&cands, "Jane Doe").source_page, PAGE);
    }

    #[test]
    fn malformed_markup_does_not_panic() {
        let cands = run("<h3>Jane <p>Doe</h3></div></span><a href='::bad'>→</a><li>");
        assert!(cands.iter().all(|c| !c.full_name.is_empty()));
    }
}

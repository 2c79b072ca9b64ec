pub mod candidates;
pub mod elements;
pub mod links;

use tracing::warn;
use url::Url;

use crate::settings::Site;
pub use candidates::RawCandidate;

/// Two-step pipeline: HTML → flat element sequence → person candidates.
pub fn extract(html: &str, page_url: &str, site: &Site) -> Vec<RawCandidate> {
    let page = Url::parse(page_url).unwrap_or_else(|err| {
        warn!(page_url, error = %err, "Unparseable page URL, resolving links against site base");
        site.base.clone()
    });
    let elements = elements::flatten(html);
    candidates::scan(&elements, &page, site)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::test_site;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn directors_fixture() {
        let page = "https://mcml.ai/team/directors/";
        let cands = extract(&fixture("directors"), page, &test_site());
        let names: Vec<&str> = cands.iter().map(|c| c.full_name.as_str()).collect();
        assert!(names.contains(&"Prof. Dr. Anna Schmidt"), "got {:?}", names);
        assert!(names.contains(&"Prof. Dr. Lukas Weber"), "got {:?}", names);
        assert!(!names.iter().any(|n| n.eq_ignore_ascii_case("board of directors")));

        let anna = cands.iter().find(|c| c.full_name == "Prof. Dr. Anna Schmidt").unwrap();
        assert_eq!(anna.role, "Director");
        assert_eq!(anna.note, "Group Schmidt");
        assert_eq!(anna.profile_url, "https://mcml.ai/research/groups/schmidt/");
        assert_eq!(anna.source_page, page);

        let lukas = cands.iter().find(|c| c.full_name == "Prof. Dr. Lukas Weber").unwrap();
        assert_eq!(lukas.role, "Deputy Director");
        assert_eq!(lukas.note, "Group Weber");
    }

    #[test]
    fn juniors_fixture_uses_sections() {
        let page = "https://mcml.ai/team/juniors/";
        let cands = extract(&fixture("juniors"), page, &test_site());
        let mia = cands.iter().find(|c| c.full_name == "Mia Hoffmann").unwrap();
        assert_eq!(mia.role, "PhD Students");
        assert_eq!(mia.profile_url, "https://www.example.edu/~mia");
        let jonas = cands.iter().find(|c| c.full_name == "Jonas Becker").unwrap();
        assert_eq!(jonas.role, "Transfer Coordinator");
        assert_eq!(jonas.profile_url, "https://mcml.ai/team/jonas-becker/");
        assert!(jonas.note.is_empty());
    }

    #[test]
    fn bad_page_url_falls_back_to_site_base() {
        let html = r#"<h3>Jane Doe</h3><a href="/team/jane/">x</a>"#;
        let cands = extract(html, "not a url", &test_site());
        let jane = cands.iter().find(|c| c.full_name == "Jane Doe").unwrap();
        assert_eq!(jane.profile_url, "https://mcml.ai/team/jane/");
        assert_eq!(jane.source_page, "https://mcml.ai/");
    }
}

use scraper::{ElementRef, Html};

use crate::text::clean_ws;

/// The tag kinds the candidate scan cares about; everything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Heading(u8),
    Paragraph,
    Anchor,
    Strong,
    ListItem,
    Span,
    Div,
    Cell,
}

impl Tag {
    pub fn from_name(name: &str) -> Option<Tag> {
        let tag = match name {
            "h1" => Tag::Heading(1),
            "h2" => Tag::Heading(2),
            "h3" => Tag::Heading(3),
            "h4" => Tag::Heading(4),
            "h5" => Tag::Heading(5),
            "p" => Tag::Paragraph,
            "a" => Tag::Anchor,
            "strong" => Tag::Strong,
            "li" => Tag::ListItem,
            "span" => Tag::Span,
            "div" => Tag::Div,
            "td" => Tag::Cell,
            _ => return None,
        };
        Some(tag)
    }

    /// Section heading: updates the running section label.
    pub fn is_section(self) -> bool {
        self == Tag::Heading(2)
    }

    /// Eligible for the look-ahead window after a name.
    pub fn in_window(self) -> bool {
        matches!(
            self,
            Tag::Paragraph
                | Tag::Anchor
                | Tag::Heading(3..=5)
                | Tag::ListItem
                | Tag::Span
                | Tag::Div
        )
    }

    /// A name-bearing element of this kind ends the previous person's block.
    pub fn breaks_block(self) -> bool {
        matches!(self, Tag::Heading(_) | Tag::Strong)
    }

    /// Carries free-text role or bio lines.
    pub fn is_descriptive(self) -> bool {
        matches!(self, Tag::Paragraph | Tag::ListItem | Tag::Span | Tag::Div)
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: Tag,
    /// All descendant text, whitespace-cleaned.
    pub text: String,
    /// Raw `href` attribute, anchors only.
    pub href: Option<String>,
}

/// Flatten a document to its relevant elements in document (pre-)order.
pub fn flatten(html: &str) -> Vec<Element> {
    let document = Html::parse_document(html);
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|el| {
            let tag = Tag::from_name(el.value().name())?;
            let href = match tag {
                Tag::Anchor => el
                    .value()
                    .attr("href")
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(str::to_string),
                _ => None,
            };
            Some(Element {
                tag,
                text: element_text(&el),
                href,
            })
        })
        .collect()
}

fn element_text(el: &ElementRef) -> String {
    let parts: Vec<&str> = el.text().map(str::trim).filter(|t| !t.is_empty()).collect();
    clean_ws(&parts.join(" "))
}

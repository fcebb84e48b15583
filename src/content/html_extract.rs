//! Main-text extraction from fetched HTML pages.

use scraper::{ElementRef, Html, Node, Selector};

/// Content regions in priority order. The first non-removed match whose
/// text exceeds `MIN_REGION_CHARS` wins.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".story-content",
    ".content-body",
    ".article-body",
    ".post-body",
    ".story-text",
    ".article-text",
    ".news-content",
    ".story-body",
    ".article-wrapper",
    ".content-wrapper",
    ".content",
    "#content",
    ".main-content",
    ".primary-content",
    ".page-content",
    ".single-post-content",
    ".entry-text",
    ".story-container",
    ".article-container",
    ".news-body",
    ".text-content",
    ".editorial-content",
    ".body-content",
    "[data-module=\"ArticleBody\"]",
    "[data-component=\"article-body\"]",
];

const MIN_REGION_CHARS: usize = 100;
const MIN_PARAGRAPH_CHARS: usize = 50;
const MIN_PARAGRAPHS: usize = 3;
const PROSE_BLOCK_CHARS: (usize, usize) = (300, 5000);
const PROSE_MIN_SENTENCES: usize = 5;
const PROSE_MIN_WORDS: usize = 50;

const REMOVED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];
const REMOVED_CLASSES: &[&str] = &["advertisement", "ads"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section",
    "table", "td", "th", "tr", "ul",
];

/// Which strategy produced the text, for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStrategy {
    Selector(&'static str),
    Paragraphs(usize),
    ProseBlock,
    Body,
}

#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub strategy: ExtractionStrategy,
}

/// Extracts the main readable text of a page. The result is raw: whitespace
/// is not yet collapsed and no length checks are applied.
pub fn extract_main_text(html: &str) -> ExtractedText {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let Some(element) = document.select(&selector).find(|el| !is_removed(el)) else {
            continue;
        };
        let text = element_text(&element);
        if text.chars().count() > MIN_REGION_CHARS {
            return ExtractedText {
                text,
                strategy: ExtractionStrategy::Selector(selector_str),
            };
        }
    }

    let paragraphs: Vec<String> = select_kept(&document, "p")
        .map(|p| element_text(&p))
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect();
    if paragraphs.len() >= MIN_PARAGRAPHS {
        return ExtractedText {
            strategy: ExtractionStrategy::Paragraphs(paragraphs.len()),
            text: paragraphs.join(" "),
        };
    }

    let prose_block = select_kept(&document, "div")
        .map(|div| element_text(&div))
        .find(|text| looks_like_prose(text));
    if let Some(text) = prose_block {
        return ExtractedText {
            text,
            strategy: ExtractionStrategy::ProseBlock,
        };
    }

    let body_text = select_kept(&document, "body")
        .next()
        .map(|body| element_text(&body))
        .unwrap_or_else(|| element_text(&document.root_element()));
    ExtractedText {
        text: body_text,
        strategy: ExtractionStrategy::Body,
    }
}

fn select_kept<'a>(document: &'a Html, selector: &str) -> impl Iterator<Item = ElementRef<'a>> {
    let selector = Selector::parse(selector).ok();
    selector
        .into_iter()
        .flat_map(move |sel| document.select(&sel).collect::<Vec<_>>())
        .filter(|el| !is_removed(el))
}

fn looks_like_prose(text: &str) -> bool {
    let chars = text.chars().count();
    if chars <= PROSE_BLOCK_CHARS.0 || chars >= PROSE_BLOCK_CHARS.1 {
        return false;
    }
    let sentences = text.split('.').count();
    let words = text.split_whitespace().count();
    sentences > PROSE_MIN_SENTENCES && words > PROSE_MIN_WORDS
}

fn is_excluded(element: &ElementRef) -> bool {
    let value = element.value();
    REMOVED_TAGS.contains(&value.name())
        || value
            .classes()
            .any(|class| REMOVED_CLASSES.contains(&class))
}

fn is_removed(element: &ElementRef) -> bool {
    is_excluded(element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_excluded(&ancestor))
}

/// Text of an element with removed regions skipped, trimmed.
fn element_text(element: &ElementRef) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out.trim().to_string()
}

fn collect_text(element: &ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_excluded(&child_element) {
                    continue;
                }
                let is_block = BLOCK_TAGS.contains(&child_element.value().name());
                if is_block {
                    out.push(' ');
                }
                collect_text(&child_element, out);
                if is_block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

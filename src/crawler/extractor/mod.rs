
use scraper::{Html, Selector};
use tracing::debug;

/// Text content harvested from a single documentation page. These fields,
/// serialized as JSON, form the record contract the corpus loader consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// The page `<title>`, empty when the page has none.
    pub title: String,
    /// Trimmed, non-empty `<p>` texts in document order.
    pub paragraphs: Vec<String>,
    /// `<code>` texts in document order.
    pub code_blocks: Vec<String>,
}

/// Extract title, paragraphs, and code blocks from an HTML document.
#[inline]
pub fn extract_content(html: &str) -> ExtractedContent {
    let title_selector = Selector::parse("title").expect("valid selector");
    let paragraph_selector = Selector::parse("p").expect("valid selector");
    let code_selector = Selector::parse("code").expect("valid selector");

    let document = Html::parse_document(html);

    let title = document
        .select(&title_selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let paragraphs: Vec<String> = document
        .select(&paragraph_selector)
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
        .collect();

    let code_blocks: Vec<String> = document
        .select(&code_selector)
        .map(|el| element_text(&el))
        .collect();

    debug!(
        "Extracted content: title='{}', {} paragraphs, {} code blocks",
        title,
        paragraphs.len(),
        code_blocks.len()
    );

    ExtractedContent {
        title,
        paragraphs,
        code_blocks,
    }
}

fn element_text(element: &scraper::ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

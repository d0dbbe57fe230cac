use crate::error::{ReadableError, Result};
use crate::types::{Article, RawDocument, ReadabilitySettings};
use chrono::DateTime;
use dom_query::{Document, Selection};
use dom_smoothie::{Config, Readability};
use tracing::{debug, info};
use url::Url;

/// Attributes lazy-loading scripts keep the real image URL in, by priority.
const LAZY_IMAGE_ATTRS: [&str; 4] = [
    "data-src",
    "data-lazy-src",
    "data-td-src-property",
    "data-srcset",
];

pub struct ArticleExtractor {
    settings: ReadabilitySettings,
}

impl ArticleExtractor {
    pub fn new(settings: ReadabilitySettings) -> Self {
        Self { settings }
    }

    pub fn extract(&self, document: &RawDocument) -> Result<Article> {
        let base_url = document.base_url.as_ref();
        info!(
            "Extracting article from {} bytes of HTML{}",
            document.html.len(),
            base_url.map(|u| format!(" ({})", u)).unwrap_or_default()
        );

        let config = Config {
            char_threshold: self.settings.char_threshold,
            max_elements_to_parse: self.settings.max_elements,
            ..Default::default()
        };

        let mut readability = Readability::new(
            document.html.as_str(),
            base_url.map(Url::as_str),
            Some(config),
        )
        .map_err(|e| ReadableError::Extraction {
            reason: e.to_string(),
        })?;

        let parsed = readability.parse().map_err(|e| ReadableError::NoArticle {
            reason: e.to_string(),
        })?;

        let text_content = parsed.text_content.to_string();
        if text_content.trim().is_empty() {
            return Err(ReadableError::NoArticle {
                reason: "extracted content has no text".to_string(),
            });
        }

        let content = Self::clean_content(&parsed.content, base_url);
        debug!(
            "Extracted {} characters of text, {} bytes of HTML",
            parsed.length,
            content.len()
        );

        Ok(Article {
            title: non_empty(Some(parsed.title)).or_else(|| sole_heading(&document.html)),
            byline: non_empty(parsed.byline),
            dir: non_empty(parsed.dir),
            lang: non_empty(parsed.lang),
            content,
            text_content,
            length: parsed.length,
            excerpt: non_empty(parsed.excerpt),
            site_name: non_empty(parsed.site_name),
            published_time: non_empty(parsed.published_time).map(|t| normalize_timestamp(&t)),
            modified_time: non_empty(parsed.modified_time).map(|t| normalize_timestamp(&t)),
            image: non_empty(parsed.image),
            favicon: non_empty(parsed.favicon),
            url: non_empty(parsed.url),
        })
    }

    /// Post-readability fixes on the article HTML: restore lazy images, drop
    /// images without a source, absolutize image URLs and unpin iframe heights.
    pub fn clean_content(content: &str, base_url: Option<&Url>) -> String {
        let doc = Document::from(content);

        for img in doc.select("img").iter() {
            restore_lazy_image(&img);

            let src = img
                .attr("src")
                .map(|s| s.trim().to_string())
                .unwrap_or_default();

            if src.is_empty() {
                img.remove();
                continue;
            }

            if let Some(base) = base_url {
                if Url::parse(&src).is_err() {
                    if let Ok(absolute) = base.join(&src) {
                        img.set_attr("src", absolute.as_str());
                    }
                }
            }
        }

        doc.select("iframe[height]").remove_attr("height");

        doc.select("body").inner_html().to_string()
    }
}

fn restore_lazy_image(img: &Selection) {
    let Some(lazy_src) = LAZY_IMAGE_ATTRS.iter().find_map(|attr| {
        img.attr(attr).map(|v| {
            if *attr == "data-srcset" {
                first_srcset_url(&v).unwrap_or_default().to_string()
            } else {
                v.to_string()
            }
        })
    }) else {
        return;
    };

    let names: Vec<String> = img
        .nodes()
        .first()
        .map(|node| {
            node.attrs()
                .iter()
                .map(|attr| attr.name.local.to_string())
                .collect()
        })
        .unwrap_or_default();

    for name in &names {
        img.remove_attr(name);
    }
    img.set_attr("src", &lazy_src);
}

/// Text of the page's only `h1`, used when readability finds no title.
fn sole_heading(html: &str) -> Option<String> {
    let doc = Document::from(html);
    let headings = doc.select("h1");
    if headings.length() != 1 {
        return None;
    }
    non_empty(Some(headings.text().to_string()))
}

/// First candidate URL of a `srcset` list (`a.jpg 1x, b.jpg 2x` -> `a.jpg`).
fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .next()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// RFC 3339 when the value is a recognizable RFC 3339 / RFC 2822 date, else verbatim.
fn normalize_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|_| raw.to_string())
}

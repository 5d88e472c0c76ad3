//! Article field extraction.
//!
//! Each field of a [`Record`] comes from its own lookup against the parsed
//! document. A lookup that finds nothing (no element, or an element without
//! the wanted attribute) yields the rule's fallback and leaves every other
//! field untouched.

use crate::error::{ParseErrorKind, ScrapeError};
use crate::models::Record;
use crate::scrapers::fetch::PageFetcher;
use crate::selectors::{Compiled, CompiledRules, JoinRule, ListRule, NumberPolicy, NumberRule, TextRule};
use itertools::Itertools;
use scraper::{ElementRef, Html};
use tracing::{debug, instrument, warn};

/// Fetch `url` and extract a [`Record`] from it.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_and_extract<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    rules: &CompiledRules,
) -> Result<Record, ScrapeError> {
    let html = fetcher.fetch(url).await?;
    extract_record(&html, url, rules)
}

/// Build a [`Record`] from an HTML document.
///
/// `url` is only used for diagnostics.
#[instrument(level = "debug", skip(html, rules), fields(bytes = html.len()))]
pub fn extract_record(html: &str, url: &str, rules: &CompiledRules) -> Result<Record, ScrapeError> {
    let document = Html::parse_document(html);

    let record = Record {
        title: text_field(&document, &rules.title),
        subtitle: text_field(&document, &rules.subtitle),
        body: joined_text(&document, &rules.body),
        image_urls: attribute_list(&document, &rules.images),
        external_link_urls: attribute_list(&document, &rules.external_links),
        author_name: text_field(&document, &rules.author_name),
        author_url: text_field(&document, &rules.author_url),
        claps: number_field(&document, &rules.claps, rules.number_policy)?,
        reading_time: text_field(&document, &rules.reading_time),
        keywords: text_field(&document, &rules.keywords),
    };

    debug!(
        title = %record.title,
        images = record.image_count(),
        external_links = record.external_link_count(),
        claps = record.claps,
        "Extracted record"
    );
    Ok(record)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn text_field(document: &Html, rule: &Compiled<TextRule>) -> String {
    let value = document
        .select(&rule.selector)
        .next()
        .and_then(|element| match &rule.rule.attribute {
            Some(name) => element.value().attr(name).map(str::to_string),
            None => Some(element_text(element)),
        });

    match value {
        Some(value) => value,
        None => {
            debug!(field = rule.field, "No match; using fallback");
            rule.rule.fallback.clone()
        }
    }
}

fn joined_text(document: &Html, rule: &Compiled<JoinRule>) -> String {
    let mut paragraphs = document.select(&rule.selector).peekable();
    if paragraphs.peek().is_none() {
        debug!(field = rule.field, "No match; using fallback");
        return rule.rule.fallback.clone();
    }
    paragraphs.map(element_text).join(&rule.rule.separator)
}

fn attribute_list(document: &Html, rule: &Compiled<ListRule>) -> Vec<String> {
    document
        .select(&rule.selector)
        .filter_map(|element| element.value().attr(&rule.rule.attribute))
        .filter(|value| match &rule.rule.prefix {
            Some(prefix) => value.starts_with(prefix.as_str()),
            None => true,
        })
        .map(str::to_string)
        .collect()
}

fn number_field(
    document: &Html,
    rule: &Compiled<NumberRule>,
    policy: NumberPolicy,
) -> Result<u64, ParseErrorKind> {
    let Some(element) = document.select(&rule.selector).next() else {
        return Ok(rule.rule.fallback);
    };

    let text = element_text(element);
    match parse_count(&text) {
        Ok(n) => Ok(n),
        Err(error) => match policy {
            NumberPolicy::Fallback => {
                warn!(field = rule.field, %text, "Non-numeric value; using fallback");
                Ok(rule.rule.fallback)
            }
            NumberPolicy::Strict => Err(ParseErrorKind::InvalidNumber {
                field: rule.field,
                text,
                error,
            }),
        },
    }
}

/// Parse a non-negative count, accepting thousands separators ("1,024").
///
/// Separators must split the digits into groups of three; anything else,
/// including a leading minus sign, is treated as non-numeric.
fn parse_count(text: &str) -> Result<u64, std::num::ParseIntError> {
    if !text.contains(',') {
        return text.parse();
    }
    let mut groups = text.split(',');
    let well_grouped = groups.next().is_some_and(|g| (1..=3).contains(&g.len()))
        && groups.all(|g| g.len() == 3);
    if well_grouped {
        text.replace(',', "").parse()
    } else {
        // Re-parse the raw text to get a ParseIntError for the caller.
        text.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::selectors::SelectorConfig;

    fn rules() -> CompiledRules {
        SelectorConfig::default().compile().unwrap()
    }

    fn strict_rules() -> CompiledRules {
        SelectorConfig {
            number_policy: NumberPolicy::Strict,
            ..SelectorConfig::default()
        }
        .compile()
        .unwrap()
    }

    const CLAPS_BUTTON: &str = "button button--chromeless u-baseColor--buttonNormal js-multirecommendCountButton u-disablePointerEvents";

    #[test]
    fn test_end_to_end_simple_document() {
        let html = r#"<html><body>
            <h1>Title</h1>
            <h2>Sub</h2>
            <p>A.</p>
            <p>B.</p>
            <img src="x.png">
            <a href="http://ext.com">ext</a>
        </body></html>"#;

        let record = extract_record(html, "http://test/", &rules()).unwrap();
        assert_eq!(record.title, "Title");
        assert_eq!(record.subtitle, "Sub");
        assert_eq!(record.body, "A.\nB.");
        assert_eq!(record.image_count(), 1);
        assert_eq!(record.image_urls, vec!["x.png"]);
        assert_eq!(record.external_link_count(), 1);
        assert_eq!(record.external_link_urls, vec!["http://ext.com"]);
        assert_eq!(record.author_name, "Author Name not found");
        assert_eq!(record.author_url, "Author URL not found");
        assert_eq!(record.reading_time, "Reading Time not found");
        assert_eq!(record.keywords, "Keywords not found");
        assert_eq!(record.claps, 0);
    }

    #[test]
    fn test_empty_document_uses_all_fallbacks() {
        let record = extract_record("", "http://test/", &rules()).unwrap();
        assert_eq!(record.title, "Title not found");
        assert_eq!(record.subtitle, "No Subtitle");
        assert_eq!(record.body, "");
        assert!(record.image_urls.is_empty());
        assert!(record.external_link_urls.is_empty());
        assert_eq!(record.claps, 0);
    }

    #[test]
    fn test_missing_title_does_not_affect_other_fields() {
        let html = r#"<h2>Only a subtitle</h2><p>Text</p>
            <meta name="keywords" content="rust, scraping">"#;
        let record = extract_record(html, "http://test/", &rules()).unwrap();
        assert_eq!(record.title, "Title not found");
        assert_eq!(record.subtitle, "Only a subtitle");
        assert_eq!(record.body, "Text");
        assert_eq!(record.keywords, "rust, scraping");
    }

    #[test]
    fn test_first_match_wins_and_text_is_trimmed() {
        let html = "<h1>\n   First  </h1><h1>Second</h1>";
        let record = extract_record(html, "http://test/", &rules()).unwrap();
        assert_eq!(record.title, "First");
    }

    #[test]
    fn test_external_links_keep_only_http_schemes() {
        let html = r##"
            <a href="https://secure.example/a">1</a>
            <a href="/relative">2</a>
            <a href="mailto:me@example.com">3</a>
            <a href="#top">4</a>
            <a>no href</a>
            <a href="http://plain.example/b">5</a>
        "##;
        let record = extract_record(html, "http://test/", &rules()).unwrap();
        assert_eq!(
            record.external_link_urls,
            vec!["https://secure.example/a", "http://plain.example/b"]
        );
        assert_eq!(record.external_link_count(), record.external_link_urls.len());
    }

    #[test]
    fn test_images_without_src_are_skipped_in_order() {
        let html = r#"<img src="a.png"><img alt="none"><img src="b.jpg">"#;
        let record = extract_record(html, "http://test/", &rules()).unwrap();
        assert_eq!(record.image_urls, vec!["a.png", "b.jpg"]);
        assert_eq!(record.image_count(), 2);
    }

    #[test]
    fn test_author_and_reading_time_attributes() {
        let html = r#"
            <div class="ui-caption"> Jane Doe </div>
            <a class="ds-link ds-link--styleSubtle link link--darken link--accent u-accentColor--textNormal"
               href="https://medium.com/@jane">Jane</a>
            <span class="readingTime" title="5 min read"></span>
        "#;
        let record = extract_record(html, "http://test/", &rules()).unwrap();
        assert_eq!(record.author_name, "Jane Doe");
        assert_eq!(record.author_url, "https://medium.com/@jane");
        assert_eq!(record.reading_time, "5 min read");
    }

    #[test]
    fn test_matched_element_without_attribute_uses_fallback() {
        let html = r#"<span class="readingTime">5 min</span><meta name="keywords">"#;
        let record = extract_record(html, "http://test/", &rules()).unwrap();
        assert_eq!(record.reading_time, "Reading Time not found");
        assert_eq!(record.keywords, "Keywords not found");
    }

    #[test]
    fn test_claps_numeric() {
        let html = format!(r#"<button class="{CLAPS_BUTTON}"> 42 </button>"#);
        let record = extract_record(&html, "http://test/", &rules()).unwrap();
        assert_eq!(record.claps, 42);
    }

    #[test]
    fn test_claps_with_thousands_separator() {
        let html = format!(r#"<button class="{CLAPS_BUTTON}">1,024</button>"#);
        let record = extract_record(&html, "http://test/", &rules()).unwrap();
        assert_eq!(record.claps, 1024);
    }

    #[test]
    fn test_parse_count_grouping() {
        assert_eq!(parse_count("7").unwrap(), 7);
        assert_eq!(parse_count("12,345,678").unwrap(), 12_345_678);
        assert!(parse_count("1,2,3").is_err());
        assert!(parse_count("1234,567").is_err());
        assert!(parse_count(",123").is_err());
        assert!(parse_count("12,34").is_err());
        assert!(parse_count("-3").is_err());
    }

    #[test]
    fn test_claps_malformed_separators_fall_back() {
        let html = format!(r#"<button class="{CLAPS_BUTTON}">1,2,3</button>"#);
        let record = extract_record(&html, "http://test/", &rules()).unwrap();
        assert_eq!(record.claps, 0);
    }

    #[test]
    fn test_claps_non_numeric_falls_back() {
        let html = format!(r#"<h1>Kept</h1><button class="{CLAPS_BUTTON}">1.2K</button>"#);
        let record = extract_record(&html, "http://test/", &rules()).unwrap();
        assert_eq!(record.claps, 0);
        assert_eq!(record.title, "Kept");
    }

    #[test]
    fn test_claps_non_numeric_strict_is_parse_error() {
        let html = format!(r#"<button class="{CLAPS_BUTTON}">1.2K</button>"#);
        let err = extract_record(&html, "http://test/", &strict_rules()).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Parse(ParseErrorKind::InvalidNumber { field: "claps", .. })
        ));
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let yaml = r#"
title:
  selector: "h1.post-title"
  fallback: "Untitled"
body:
  selector: "article p"
  separator: " "
"#;
        let rules = SelectorConfig::from_yaml_str(yaml, "inline")
            .unwrap()
            .compile()
            .unwrap();
        let html = r#"<h1>Site name</h1><h1 class="post-title">Post</h1>
            <p>outside</p><article><p>one</p><p>two</p></article>"#;
        let record = extract_record(html, "http://test/", &rules).unwrap();
        assert_eq!(record.title, "Post");
        assert_eq!(record.body, "one two");
    }

    struct StaticFetcher(Result<&'static str, u16>);

    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            match self.0 {
                Ok(body) => Ok(body.to_string()),
                Err(status) => Err(FetchError::Status(status)),
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_and_extract_success() {
        let fetcher = StaticFetcher(Ok("<h1>Fetched</h1>"));
        let record = fetch_and_extract(&fetcher, "http://test/", &rules())
            .await
            .unwrap();
        assert_eq!(record.title, "Fetched");
    }

    #[tokio::test]
    async fn test_fetch_and_extract_fetch_error() {
        let fetcher = StaticFetcher(Err(503));
        let err = fetch_and_extract(&fetcher, "http://test/", &rules())
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch(FetchError::Status(503))));
    }
}

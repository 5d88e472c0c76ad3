//! Named selector rules, one per record field.
//!
//! The built-in table targets Medium-style article pages. A YAML file can
//! override any subset of the rules, down to single keys; everything it does
//! not mention keeps its built-in value:
//!
//! ```yaml
//! title:
//!   selector: "h1.post-title"
//!   fallback: "Untitled"
//! reading_time:
//!   selector: "span.read-time"
//!   fallback: "unknown"
//! number_policy: strict
//! ```
//!
//! Rules are compiled into [`CompiledRules`] once, before the first page is
//! fetched, so a bad selector is reported at startup rather than per page.

use crate::error::ConfigError;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tokio::fs;
use tracing::{info, instrument};

/// First match of `selector`; its trimmed text, or `attribute` when set.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TextRule {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    pub fallback: String,
}

/// Trimmed text of every match, joined with `separator`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JoinRule {
    pub selector: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub fallback: String,
}

fn default_separator() -> String {
    "\n".to_string()
}

/// `attribute` of every match in document order, optionally restricted to
/// values starting with `prefix`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListRule {
    pub selector: String,
    pub attribute: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// First match of `selector`, its text read as an unsigned integer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NumberRule {
    pub selector: String,
    #[serde(default)]
    pub fallback: u64,
}

/// What to do when a numeric field matches an element with non-numeric text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberPolicy {
    /// Log a warning and use the rule's fallback.
    #[default]
    Fallback,
    /// Reject the whole record with a parse error.
    Strict,
}

/// The full selector table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub title: TextRule,
    pub subtitle: TextRule,
    pub body: JoinRule,
    pub images: ListRule,
    pub external_links: ListRule,
    pub author_name: TextRule,
    pub author_url: TextRule,
    pub claps: NumberRule,
    pub reading_time: TextRule,
    pub keywords: TextRule,
    pub number_policy: NumberPolicy,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: text_rule("h1", None, "Title not found"),
            subtitle: text_rule("h2", None, "No Subtitle"),
            body: JoinRule {
                selector: "p".to_string(),
                separator: default_separator(),
                fallback: String::new(),
            },
            images: ListRule {
                selector: "img[src]".to_string(),
                attribute: "src".to_string(),
                prefix: None,
            },
            external_links: ListRule {
                selector: "a[href]".to_string(),
                attribute: "href".to_string(),
                prefix: Some("http".to_string()),
            },
            author_name: text_rule("div.ui-caption", None, "Author Name not found"),
            author_url: text_rule(
                "a.ds-link.ds-link--styleSubtle.link.link--darken.link--accent.u-accentColor--textNormal",
                Some("href"),
                "Author URL not found",
            ),
            claps: NumberRule {
                selector: "button.button.button--chromeless.u-baseColor--buttonNormal.js-multirecommendCountButton.u-disablePointerEvents".to_string(),
                fallback: 0,
            },
            reading_time: text_rule("span.readingTime", Some("title"), "Reading Time not found"),
            keywords: text_rule("meta[name=\"keywords\"]", Some("content"), "Keywords not found"),
            number_policy: NumberPolicy::Fallback,
        }
    }
}

fn text_rule(selector: &str, attribute: Option<&str>, fallback: &str) -> TextRule {
    TextRule {
        selector: selector.to_string(),
        attribute: attribute.map(str::to_string),
        fallback: fallback.to_string(),
    }
}

impl SelectorConfig {
    /// Parse a (possibly partial) YAML selector table.
    ///
    /// The YAML is merged key by key over the built-in table, so a rule that
    /// only names a `selector` keeps its built-in `fallback` and `attribute`.
    pub fn from_yaml_str(yaml: &str, path: &str) -> Result<Self, ConfigError> {
        let to_config_error = |source: serde_yaml::Error| ConfigError::Yaml {
            path: path.to_string(),
            source,
        };
        let mut merged = serde_yaml::to_value(Self::default()).map_err(to_config_error)?;
        let overrides: Value = serde_yaml::from_str(yaml).map_err(to_config_error)?;
        merge_yaml(&mut merged, overrides);
        serde_yaml::from_value(merged).map_err(to_config_error)
    }

    /// Read and parse a YAML selector table from disk.
    #[instrument(level = "info", skip_all, fields(%path))]
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_string(),
                source,
            })?;
        let config = Self::from_yaml_str(&yaml, path)?;
        info!("Loaded selector config");
        Ok(config)
    }

    /// Parse every selector, failing on the first invalid one.
    pub fn compile(self) -> Result<CompiledRules, ConfigError> {
        Ok(CompiledRules {
            title: Compiled::new("title", self.title.selector.clone(), self.title)?,
            subtitle: Compiled::new("subtitle", self.subtitle.selector.clone(), self.subtitle)?,
            body: Compiled::new("body", self.body.selector.clone(), self.body)?,
            images: Compiled::new("images", self.images.selector.clone(), self.images)?,
            external_links: Compiled::new(
                "external_links",
                self.external_links.selector.clone(),
                self.external_links,
            )?,
            author_name: Compiled::new(
                "author_name",
                self.author_name.selector.clone(),
                self.author_name,
            )?,
            author_url: Compiled::new("author_url", self.author_url.selector.clone(), self.author_url)?,
            claps: Compiled::new("claps", self.claps.selector.clone(), self.claps)?,
            reading_time: Compiled::new(
                "reading_time",
                self.reading_time.selector.clone(),
                self.reading_time,
            )?,
            keywords: Compiled::new("keywords", self.keywords.selector.clone(), self.keywords)?,
            number_policy: self.number_policy,
        })
    }
}

/// Overlay `overrides` onto `base`: mappings merge recursively, any other
/// value replaces what was there. An empty document changes nothing.
fn merge_yaml(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overrides)) => {
            for (key, value) in overrides {
                if value.is_mapping() {
                    if let Some(slot) = base.get_mut(&key) {
                        merge_yaml(slot, value);
                        continue;
                    }
                }
                base.insert(key, value);
            }
        }
        (base, overrides) => *base = overrides,
    }
}

/// A rule together with its parsed selector.
#[derive(Debug)]
pub struct Compiled<R> {
    pub field: &'static str,
    pub selector: Selector,
    pub rule: R,
}

impl<R> Compiled<R> {
    fn new(field: &'static str, css: String, rule: R) -> Result<Self, ConfigError> {
        let selector = Selector::parse(&css).map_err(|e| ConfigError::InvalidSelector {
            field,
            selector: css.clone(),
            error: e.to_string(),
        })?;
        Ok(Self {
            field,
            selector,
            rule,
        })
    }
}

/// Selector table ready for extraction.
#[derive(Debug)]
pub struct CompiledRules {
    pub title: Compiled<TextRule>,
    pub subtitle: Compiled<TextRule>,
    pub body: Compiled<JoinRule>,
    pub images: Compiled<ListRule>,
    pub external_links: Compiled<ListRule>,
    pub author_name: Compiled<TextRule>,
    pub author_url: Compiled<TextRule>,
    pub claps: Compiled<NumberRule>,
    pub reading_time: Compiled<TextRule>,
    pub keywords: Compiled<TextRule>,
    pub number_policy: NumberPolicy,
}

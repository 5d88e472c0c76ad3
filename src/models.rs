//! The record produced for each scraped page.
//!
//! A [`Record`] always has every field populated: either with what the page
//! provided or with the fallback literal of the field's selector rule. The
//! image and link counts are derived from their lists rather than stored, so
//! they can never disagree.

use serde::Serialize;

/// Column names of the CSV output, in row order.
pub const CSV_HEADER: [&str; 11] = [
    "Title",
    "Subtitle",
    "Text",
    "No. of images",
    "Image URLs",
    "No. of external links",
    "Author Name",
    "Author URL",
    "Claps",
    "Reading Time",
    "Keywords",
];

/// Fields extracted from one article page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub title: String,
    pub subtitle: String,
    /// Paragraph texts joined with newlines.
    pub body: String,
    /// `src` of every image, in document order.
    pub image_urls: Vec<String>,
    /// http(s) link targets, in document order.
    pub external_link_urls: Vec<String>,
    pub author_name: String,
    pub author_url: String,
    pub claps: u64,
    pub reading_time: String,
    pub keywords: String,
}

impl Record {
    pub fn image_count(&self) -> usize {
        self.image_urls.len()
    }

    pub fn external_link_count(&self) -> usize {
        self.external_link_urls.len()
    }

    /// Cells of this record in [`CSV_HEADER`] order.
    ///
    /// The image list is written as a JSON array; external links are
    /// written only as a count.
    pub fn csv_row(&self) -> Result<[String; 11], serde_json::Error> {
        Ok([
            self.title.clone(),
            self.subtitle.clone(),
            self.body.clone(),
            self.image_count().to_string(),
            serde_json::to_string(&self.image_urls)?,
            self.external_link_count().to_string(),
            self.author_name.clone(),
            self.author_url.clone(),
            self.claps.to_string(),
            self.reading_time.clone(),
            self.keywords.clone(),
        ])
    }
}

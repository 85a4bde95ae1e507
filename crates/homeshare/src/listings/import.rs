//! CSV import for listing exports, used to hydrate a feed from operator data.
//!
//! Unlike the end-user filter bar, import is strict: a malformed category or
//! price fails the whole import with the offending row number.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{ContactChannels, ListingCategory, ListingDraft};

pub struct ListingCsvImporter;

impl ListingCsvImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<ListingDraft>, ListingImportError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        parse_drafts(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ListingDraft>, ListingImportError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        parse_drafts(reader)
    }
}

fn parse_drafts<R: Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<ListingDraft>, ListingImportError> {
    let mut drafts = Vec::new();

    for (index, record) in reader.deserialize::<ListingRow>().enumerate() {
        // header is line 1
        let row = index + 2;
        let parsed = record?;
        drafts.push(parsed.into_draft(row)?);
    }

    Ok(drafts)
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Price")]
    price: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Amenities", default, deserialize_with = "empty_string_as_none")]
    amenities: Option<String>,
    #[serde(rename = "Phone", default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(rename = "Zalo", default, deserialize_with = "empty_string_as_none")]
    zalo: Option<String>,
    #[serde(rename = "Email", default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
}

impl ListingRow {
    fn into_draft(self, row: usize) -> Result<ListingDraft, ListingImportError> {
        let category = ListingCategory::from_param(&self.category).ok_or_else(|| {
            ListingImportError::UnknownCategory {
                row,
                value: self.category.clone(),
            }
        })?;

        let price =
            self.price
                .trim()
                .parse::<u64>()
                .map_err(|_| ListingImportError::InvalidPrice {
                    row,
                    value: self.price.clone(),
                })?;

        let amenities = self
            .amenities
            .as_deref()
            .map(split_labels)
            .unwrap_or_default();

        Ok(ListingDraft {
            category,
            title: self.title,
            description: self.description,
            price,
            location: self.location,
            images: Vec::new(),
            amenities,
            contact: ContactChannels {
                phone: self.phone,
                zalo: self.zalo,
                email: self.email,
            },
        })
    }
}

fn split_labels(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, thiserror::Error)]
pub enum ListingImportError {
    #[error("failed to read listing export: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown listing category '{value}'")]
    UnknownCategory { row: usize, value: String },
    #[error("row {row}: invalid price '{value}'")]
    InvalidPrice { row: usize, value: String },
}

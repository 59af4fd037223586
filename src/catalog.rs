use std::{
    collections::{BTreeSet, HashMap},
    fs, io,
    path::Path,
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::{PICKER, STORAGE},
    error::CatalogLoadError,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StickerRecord {
    pub id: String,
    pub file: String,
    pub label: String,
    pub category: String,
    pub tags: BTreeSet<String>,
}

impl StickerRecord {
    /// Lowercased search haystack. Only a category written in the feed is
    /// searchable; the "Other" fallback is not.
    fn search_text(&self, feed_category: Option<&str>) -> String {
        [self.id.as_str(), self.label.as_str(), feed_category.unwrap_or("")]
            .into_iter()
            .chain(self.tags.iter().map(String::as_str))
            .filter(|part| !part.is_empty())
            .join(" ")
            .to_lowercase()
    }
}

/// One sticker as it appears in a feed. The image may be named `file` or `src`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeedSticker {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeedGroup {
    #[serde(default)]
    pub category: Option<String>,
    pub items: Vec<FeedSticker>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum CatalogFeed {
    Flat(Vec<FeedSticker>),
    Grouped(Vec<FeedGroup>),
}

impl CatalogFeed {
    /// Grouped when the first element carries an `items` array, flat otherwise.
    pub fn from_value(value: Value) -> Result<Self, CatalogLoadError> {
        let Value::Array(entries) = value else {
            return Err(CatalogLoadError::NotASequence);
        };

        let grouped = entries
            .first()
            .and_then(|first| first.get("items"))
            .is_some_and(Value::is_array);

        if grouped {
            decode_entries(entries).map(CatalogFeed::Grouped)
        } else {
            decode_entries(entries).map(CatalogFeed::Flat)
        }
    }
}

fn decode_entries<T: serde::de::DeserializeOwned>(
    entries: Vec<Value>,
) -> Result<Vec<T>, CatalogLoadError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).map_err(|e| CatalogLoadError::InvalidRecord {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub stickers: Vec<StickerRecord>,
}

impl CategoryGroup {
    fn sorted(category: String, mut stickers: Vec<StickerRecord>) -> Self {
        stickers.sort_by(|a, b| a.id.cmp(&b.id));
        Self { category, stickers }
    }
}

pub struct Catalog {
    flat: Vec<StickerRecord>,
    grouped: Vec<CategoryGroup>,
    haystacks: Vec<String>,
    by_id: HashMap<String, usize>,
    duplicates: Vec<String>,
    asset_base: String,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                CatalogLoadError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                CatalogLoadError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let catalog = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            stickers = catalog.len(),
            categories = catalog.grouped.len(),
            "loaded sticker catalog"
        );
        Ok(catalog)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CatalogLoadError> {
        let value: Value = serde_json::from_str(content).map_err(CatalogLoadError::Malformed)?;
        Self::from_feed(CatalogFeed::from_value(value)?)
    }

    pub fn from_feed(feed: CatalogFeed) -> Result<Self, CatalogLoadError> {
        let (flat, haystacks, grouped) = match feed {
            CatalogFeed::Flat(items) => {
                let (flat, haystacks): (Vec<_>, Vec<_>) = items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| resolve_record(index, item, None))
                    .collect::<Result<Vec<_>, _>>()?
                    .into_iter()
                    .unzip();
                let grouped = group_by_category(&flat);
                (flat, haystacks, grouped)
            }
            CatalogFeed::Grouped(groups) => {
                let mut index = 0;
                let mut flat = Vec::new();
                let mut haystacks = Vec::new();
                for group in groups {
                    let category = non_empty(group.category);
                    for item in group.items {
                        let (record, haystack) =
                            resolve_record(index, item, category.as_deref())?;
                        flat.push(record);
                        haystacks.push(haystack);
                        index += 1;
                    }
                }
                let grouped = group_in_feed_order(&flat);
                (flat, haystacks, grouped)
            }
        };

        let mut by_id = HashMap::with_capacity(flat.len());
        let mut duplicates = Vec::new();
        for (index, record) in flat.iter().enumerate() {
            if by_id.insert(record.id.clone(), index).is_some() {
                tracing::warn!(id = %record.id, "duplicate sticker id, later entry wins");
                duplicates.push(record.id.clone());
            }
        }

        Ok(Self {
            flat,
            grouped,
            haystacks,
            by_id,
            duplicates,
            asset_base: STORAGE.asset_base.to_string(),
        })
    }

    pub fn with_asset_base(mut self, base: impl Into<String>) -> Self {
        self.asset_base = base.into();
        self
    }

    pub fn get(&self, id: &str) -> Option<&StickerRecord> {
        self.by_id.get(id).map(|&index| &self.flat[index])
    }

    pub fn flat(&self) -> &[StickerRecord] {
        &self.flat
    }

    pub fn grouped(&self) -> &[CategoryGroup] {
        &self.grouped
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    pub fn duplicate_ids(&self) -> &[String] {
        &self.duplicates
    }

    pub fn image_path(&self, record: &StickerRecord) -> String {
        format!("{}/{}", self.asset_base.trim_end_matches('/'), record.file)
    }

    pub fn categories(&self) -> Vec<&str> {
        self.flat
            .iter()
            .map(|record| record.category.as_str())
            .unique()
            .sorted()
            .collect()
    }

    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<&StickerRecord> {
        let needle = query.trim().to_lowercase();
        self.flat
            .iter()
            .zip(&self.haystacks)
            .filter(|(record, _)| category.is_none_or(|c| record.category == c))
            .filter(|(_, haystack)| needle.is_empty() || haystack.contains(&needle))
            .map(|(record, _)| record)
            .take(PICKER.result_limit)
            .collect()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Resolves one feed item and its search haystack. `group_category` is the
/// enclosing group's category as written, if any.
fn resolve_record(
    index: usize,
    item: FeedSticker,
    group_category: Option<&str>,
) -> Result<(StickerRecord, String), CatalogLoadError> {
    if item.id.is_empty() {
        return Err(CatalogLoadError::InvalidRecord {
            index,
            reason: "empty sticker id".to_string(),
        });
    }

    let Some(file) = non_empty(item.file).or_else(|| non_empty(item.src)) else {
        return Err(CatalogLoadError::InvalidRecord {
            index,
            reason: format!("sticker `{}` has no `file` or `src`", item.id),
        });
    };

    let label = non_empty(item.label).unwrap_or_else(|| item.id.clone());
    let feed_category = non_empty(item.category).or_else(|| group_category.map(str::to_string));
    let category = feed_category
        .clone()
        .unwrap_or_else(|| PICKER.default_category.to_string());

    let record = StickerRecord {
        id: item.id,
        file,
        label,
        category,
        tags: item.tags.into_iter().collect(),
    };
    let haystack = record.search_text(feed_category.as_deref());
    Ok((record, haystack))
}

fn group_by_category(flat: &[StickerRecord]) -> Vec<CategoryGroup> {
    flat.iter()
        .cloned()
        .into_group_map_by(|record| record.category.clone())
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .map(|(category, stickers)| CategoryGroup::sorted(category, stickers))
        .collect()
}

/// Buckets a grouped feed on each record's resolved category, keeping the
/// order in which categories first appear.
fn group_in_feed_order(flat: &[StickerRecord]) -> Vec<CategoryGroup> {
    let order: Vec<String> = flat
        .iter()
        .map(|record| record.category.clone())
        .unique()
        .collect();
    let mut buckets = flat
        .iter()
        .cloned()
        .into_group_map_by(|record| record.category.clone());

    order
        .into_iter()
        .filter_map(|category| {
            let stickers = buckets.remove(&category)?;
            Some(CategoryGroup::sorted(category, stickers))
        })
        .collect()
}

/// Builds a grouped feed from a directory of `.png` stickers.
///
/// The category is the leading run of letters and dashes in the file stem.
pub fn generate_feed(dir: &Path) -> io::Result<CatalogFeed> {
    let mut files: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".png"))
        .collect();
    files.sort();

    let groups = files
        .into_iter()
        .map(|file| {
            let id = file.trim_end_matches(".png").to_string();
            let key: String = id
                .chars()
                .take_while(|c| c.is_ascii_alphabetic() || *c == '-')
                .collect();
            let key = if key.is_empty() {
                "other".to_string()
            } else {
                key
            };
            (key, id, file)
        })
        .into_group_map_by(|(key, _, _)| key.clone())
        .into_iter()
        .sorted_by(|a, b| {
            a.0.to_lowercase()
                .cmp(&b.0.to_lowercase())
                .then_with(|| a.0.cmp(&b.0))
        })
        .map(|(key, entries)| {
            let label = key.replace('-', " ");
            let items = entries
                .into_iter()
                .sorted_by(|a, b| a.1.cmp(&b.1))
                .map(|(_, id, file)| FeedSticker {
                    id,
                    file: Some(file),
                    label: Some(label.clone()),
                    ..FeedSticker::default()
                })
                .collect();
            FeedGroup {
                category: Some(title_case(&label)),
                items,
            }
        })
        .collect();

    Ok(CatalogFeed::Grouped(groups))
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .join(" ")
}

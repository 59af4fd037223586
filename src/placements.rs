use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::DayKey;

/// Day key to sticker id. One sticker per day; absence means no sticker.
///
/// Keys stay plain strings so imported keys survive verbatim, and sticker ids
/// are never checked against the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementMap(BTreeMap<String, String>);

impl PlacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: DayKey, sticker_id: impl Into<String>) {
        self.0.insert(key.to_string(), sticker_id.into());
    }

    pub fn remove(&mut self, key: DayKey) -> Option<String> {
        self.0.remove(&key.to_string())
    }

    pub fn get(&self, key: DayKey) -> Option<&str> {
        self.0.get(&key.to_string()).map(String::as_str)
    }

    pub fn clear_year(&mut self, year: i32) -> usize {
        let prefix = DayKey::year_prefix(year);
        let before = self.0.len();
        self.0.retain(|key, _| !key.starts_with(&prefix));
        before - self.0.len()
    }

    pub fn count_for_month(&self, year: i32, month0: u32) -> usize {
        let prefix = DayKey::month_prefix(year, month0);
        self.0.keys().filter(|key| key.starts_with(&prefix)).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for PlacementMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        PlacementMap(iter.into_iter().collect())
    }
}

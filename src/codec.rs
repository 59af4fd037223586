use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::{MonthCursor, ViewMode},
    error::{ImportValidationError, StorageError},
    placements::PlacementMap,
};

/// Everything that is persisted, exported and imported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppState {
    pub cursor: MonthCursor,
    pub view: ViewMode,
    pub placements: PlacementMap,
}

impl AppState {
    pub fn starting_at(today: NaiveDate) -> Self {
        Self {
            cursor: MonthCursor::containing(today),
            view: ViewMode::Month,
            placements: PlacementMap::new(),
        }
    }

    pub fn to_document(&self) -> StateDocument {
        StateDocument {
            year: self.cursor.year(),
            month: self.cursor.month0(),
            view: self.view,
            placements: self.placements.clone(),
        }
    }
}

/// Wire shape: `{year, month (0-11), view, placements}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    pub year: i32,
    pub month: u32,
    pub view: ViewMode,
    pub placements: PlacementMap,
}

pub fn encode(state: &AppState) -> Result<String, StorageError> {
    serde_json::to_string_pretty(&state.to_document()).map_err(StorageError::Encode)
}

pub fn export_file_name(year: i32) -> String {
    format!("sticker-year-{}.json", year)
}

/// Fields present in an accepted import. Absent or null fields keep the
/// importer's current value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportPatch {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub view: Option<ViewMode>,
    pub placements: PlacementMap,
}

impl ImportPatch {
    pub fn apply_to(self, current: &AppState) -> AppState {
        let year = self.year.unwrap_or(current.cursor.year() as i64);
        let month = self.month.unwrap_or(current.cursor.month0() as i64);

        AppState {
            cursor: MonthCursor::normalized(year, month),
            view: self.view.unwrap_or(current.view),
            placements: self.placements,
        }
    }
}

pub fn parse_import(text: &str) -> Result<ImportPatch, ImportValidationError> {
    let value: Value = serde_json::from_str(text).map_err(ImportValidationError::Malformed)?;
    let Value::Object(fields) = value else {
        return Err(ImportValidationError::NotAnObject);
    };

    let placements = match present(&fields, "placements") {
        None => return Err(ImportValidationError::MissingPlacements),
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(key, id)| match id {
                Value::String(id) => Ok((key.clone(), id.clone())),
                _ => Err(invalid("placements", "an object of day keys to sticker ids")),
            })
            .collect::<Result<PlacementMap, _>>()?,
        Some(_) => {
            return Err(invalid(
                "placements",
                "an object of day keys to sticker ids",
            ));
        }
    };

    let year = present(&fields, "year")
        .map(|v| v.as_i64().ok_or_else(|| invalid("year", "an integer")))
        .transpose()?;

    let month = present(&fields, "month")
        .map(|v| v.as_i64().ok_or_else(|| invalid("month", "an integer")))
        .transpose()?;

    let view = present(&fields, "view")
        .map(|v| {
            ViewMode::deserialize(v).map_err(|_| invalid("view", "\"month\" or \"year\""))
        })
        .transpose()?;

    Ok(ImportPatch {
        year,
        month,
        view,
        placements,
    })
}

pub fn import_into(current: &AppState, text: &str) -> Result<AppState, ImportValidationError> {
    parse_import(text).map(|patch| patch.apply_to(current))
}

/// Best-effort read of a stored state that failed [`parse_import`]: every
/// field that does not validate is dropped instead of rejecting the whole
/// document, and placements keep each string-valued entry. `None` when the
/// text is not a JSON object at all.
pub fn salvage(current: &AppState, text: &str) -> Option<AppState> {
    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(text) else {
        return None;
    };

    let placements = match present(&fields, "placements") {
        Some(Value::Object(entries)) => entries
            .iter()
            .filter_map(|(key, id)| id.as_str().map(|id| (key.clone(), id.to_string())))
            .collect(),
        _ => PlacementMap::new(),
    };

    let patch = ImportPatch {
        year: present(&fields, "year").and_then(Value::as_i64),
        month: present(&fields, "month").and_then(Value::as_i64),
        view: present(&fields, "view").and_then(|v| ViewMode::deserialize(v).ok()),
        placements,
    };
    Some(patch.apply_to(current))
}

fn present<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|v| !v.is_null())
}

fn invalid(field: &'static str, expected: &'static str) -> ImportValidationError {
    ImportValidationError::InvalidField { field, expected }
}

#[cfg(test)]
mod tests {
    use crate::domain::DayKey;

    use super::*;

    #[test]
    fn test_salvage_keeps_fields_that_validate() {
        let current = AppState::starting_at(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        let text = r#"{"year": 2026, "month": 9, "view": "Month",
            "placements": {"2026-10-01": "sun", "2026-10-02": "moon", "2026-10-03": 7}}"#;
        assert!(parse_import(text).is_err());

        let state = salvage(&current, text).unwrap();
        assert_eq!(state.cursor, MonthCursor::new(2026, 9));
        assert_eq!(state.view, ViewMode::Month);
        assert_eq!(state.placements.len(), 2);
        assert_eq!(
            state.placements.get(DayKey::from_ymd(2026, 10, 2).unwrap()),
            Some("moon")
        );

        assert!(salvage(&current, "[1, 2]").is_none());
        assert!(salvage(&current, "{not json").is_none());
        let bare = salvage(&current, r#"{"year": "soon"}"#).unwrap();
        assert_eq!(bare, current);
    }

    fn sample_state() -> AppState {
        let mut state = AppState::starting_at(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        state.view = ViewMode::Year;
        state
            .placements
            .set("2025-06-01".parse::<DayKey>().unwrap(), "sun");
        state
            .placements
            .set("2025-06-02".parse::<DayKey>().unwrap(), "not-in-catalog");
        state
    }

    #[test]
    fn test_export_has_exactly_four_fields() {
        let json = encode(&sample_state()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["month", "placements", "view", "year"]);
        assert_eq!(value["year"], 2025);
        assert_eq!(value["month"], 5);
        assert_eq!(value["view"], "year");
        assert_eq!(value["placements"]["2025-06-02"], "not-in-catalog");
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_export_then_import_reproduces_placements() {
        let state = sample_state();
        let exported = encode(&state).unwrap();

        let other = AppState::starting_at(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let imported = import_into(&other, &exported).unwrap();
        assert_eq!(imported, state);
    }

    #[test]
    fn test_placements_only_import_keeps_cursor() {
        let current = sample_state();
        let imported =
            import_into(&current, r#"{"placements": {"2024-01-01": "star"}}"#).unwrap();

        assert_eq!(imported.cursor, current.cursor);
        assert_eq!(imported.view, current.view);
        assert_eq!(imported.placements.len(), 1);
        assert_eq!(
            imported
                .placements
                .get("2024-01-01".parse::<DayKey>().unwrap()),
            Some("star")
        );
    }

    #[test]
    fn test_null_fields_fall_back_to_current() {
        let current = sample_state();
        let imported = import_into(
            &current,
            r#"{"year": null, "month": null, "view": null, "placements": {}}"#,
        )
        .unwrap();
        assert_eq!(imported.cursor, current.cursor);
        assert_eq!(imported.view, current.view);
        assert!(imported.placements.is_empty());
    }

    #[test]
    fn test_rejected_documents() {
        let current = sample_state();
        for text in [
            "null",
            "[]",
            "42",
            r#"{"year": 2025}"#,
            r#"{"placements": null}"#,
            r#"{"placements": "yes"}"#,
            r#"{"placements": {"2025-01-01": 7}}"#,
            r#"{"placements": {}, "view": "week"}"#,
            r#"{"placements": {}, "month": "March"}"#,
            r#"{"placements": {}, "year": 2025.5}"#,
            "{not json",
        ] {
            assert!(import_into(&current, text).is_err(), "accepted {text}");
        }

        assert!(matches!(
            parse_import(r#"{"year": 2025}"#),
            Err(ImportValidationError::MissingPlacements)
        ));
        assert!(matches!(
            parse_import("null"),
            Err(ImportValidationError::NotAnObject)
        ));
    }

    #[test]
    fn test_out_of_range_month_is_carried() {
        let current = sample_state();
        let imported =
            import_into(&current, r#"{"year": 2025, "month": 13, "placements": {}}"#).unwrap();
        assert_eq!(imported.cursor, MonthCursor::new(2026, 1));

        let imported =
            import_into(&current, r#"{"year": 2025, "month": -1, "placements": {}}"#).unwrap();
        assert_eq!(imported.cursor, MonthCursor::new(2024, 11));
    }

    #[test]
    fn test_export_file_name_uses_year() {
        assert_eq!(export_file_name(2025), "sticker-year-2025.json");
    }
}

//! Conversions between warehouse session settings, Postgres rows and JSON.

use serde_json::{Map, Value};
use snowgate_mcp::warehouse::{QUERY_TAG, Row};
use sqlx::postgres::PgRow;
use sqlx::types::BigDecimal;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::collections::BTreeMap;

/// Postgres has no query tag; it is carried in `application_name`.
const QUERY_TAG_SETTING: &str = "application_name";

/// Map session parameters to `set_config` names and values.
pub fn session_settings(parameters: &BTreeMap<String, String>) -> Vec<(String, String)> {
    parameters
        .iter()
        .map(|(name, value)| {
            let setting = if name.eq_ignore_ascii_case(QUERY_TAG) {
                QUERY_TAG_SETTING.to_string()
            } else {
                name.to_lowercase()
            };
            (setting, value.clone())
        })
        .collect()
}

/// Convert a row to a JSON object, keyed by column name or by position.
pub fn row_to_json(row: &PgRow, row_mapping: bool) -> Row {
    let mut obj = Map::new();

    for (index, column) in row.columns().iter().enumerate() {
        let key = if row_mapping {
            column.name().to_string()
        } else {
            index.to_string()
        };
        obj.insert(key, column_value(row, index));
    }

    obj
}

fn column_value(row: &PgRow, index: usize) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Err(_) => return Value::Null,
        Ok(_) => {}
    }

    if let Ok(v) = row.try_get::<i64, _>(index) {
        Value::from(v)
    } else if let Ok(v) = row.try_get::<i32, _>(index) {
        Value::from(v)
    } else if let Ok(v) = row.try_get::<i16, _>(index) {
        Value::from(v)
    } else if let Ok(v) = row.try_get::<f64, _>(index) {
        Value::from(v)
    } else if let Ok(v) = row.try_get::<f32, _>(index) {
        Value::from(v)
    } else if let Ok(v) = row.try_get::<bool, _>(index) {
        Value::from(v)
    } else if let Ok(v) = row.try_get::<BigDecimal, _>(index) {
        Value::String(v.to_string())
    } else if let Ok(v) = row.try_get::<String, _>(index) {
        Value::String(v)
    } else if let Ok(v) = row.try_get::<Value, _>(index) {
        v
    } else if let Ok(v) = row.try_get::<uuid::Uuid, _>(index) {
        Value::String(v.to_string())
    } else if let Ok(v) = row.try_get::<chrono::DateTime<chrono::Utc>, _>(index) {
        Value::String(v.to_rfc3339())
    } else if let Ok(v) = row.try_get::<chrono::NaiveDateTime, _>(index) {
        Value::String(v.to_string())
    } else if let Ok(v) = row.try_get::<chrono::NaiveDate, _>(index) {
        Value::String(v.to_string())
    } else if let Ok(v) = row.try_get::<chrono::NaiveTime, _>(index) {
        Value::String(v.to_string())
    } else {
        let type_name = row.columns()[index].type_info().name().to_string();
        tracing::debug!(
            column = index,
            column_type = %type_name,
            "Unsupported column type, returning null"
        );
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_tag_maps_to_application_name() {
        let parameters = BTreeMap::from([
            ("QUERY_TAG".to_string(), "{\"origin\":\"snowgate\"}".to_string()),
            ("TIMEZONE".to_string(), "UTC".to_string()),
        ]);

        let settings = session_settings(&parameters);

        assert_eq!(
            settings,
            vec![
                ("application_name".to_string(), "{\"origin\":\"snowgate\"}".to_string()),
                ("timezone".to_string(), "UTC".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_parameters() {
        assert!(session_settings(&BTreeMap::new()).is_empty());
    }
}

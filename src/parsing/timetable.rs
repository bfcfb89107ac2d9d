use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{Error, Result},
    model::Timetable,
};

/// Walks `props.timetable.table` of a dashboard page object. The table is returned as
/// is, one inner list per day.
pub fn extract_table(page: &Value) -> Result<Timetable> {
    let props = non_empty(page.get("props")).ok_or_else(|| missing("props"))?;
    let timetable = non_empty(props.get("timetable")).ok_or_else(|| missing("timetable"))?;
    let table = match timetable.get("table") {
        None | Some(Value::Null) => return Err(missing("table")),
        Some(table) => table,
    };

    Timetable::deserialize(table)
        .map_err(|e| Error::Protocol(format!("unexpected timetable table shape: {e}")))
}

fn non_empty(value: Option<&Value>) -> Option<&Value> {
    match value? {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other),
    }
}

fn missing(key: &str) -> Error {
    Error::Protocol(format!("response missing '{key}'"))
}

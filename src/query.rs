const DEFAULT_TIME_VALUE: &str = "1";

/// Resolves the time value field: an empty or absent value becomes `"1"`.
pub fn resolve_time_value(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => DEFAULT_TIME_VALUE,
    }
}

/// Composes the natural-language query sent to the analysis endpoint.
pub fn compose_query(time_value: Option<&str>, time_unit: Option<&str>) -> String {
    format!(
        "Выдай новости за {} {}",
        resolve_time_value(time_value),
        time_unit.unwrap_or_default()
    )
}

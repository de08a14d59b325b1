use serde_json::Value;

/// Print just the key answer from the output.
///
/// Looks for well-known result fields in order of priority, then falls back
/// to the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // JSON pointers into the result, most specific first
    let priority_paths = [
        "/ranking/best_risk_adjusted/scenario",
        "/npv/mean",
    ];

    for path in &priority_paths {
        if let Some(val) = result_obj.pointer(path) {
            if !val.is_null() {
                println!("{}", format_minimal(val));
                return;
            }
        }
    }

    match result_obj {
        // Scenario listings: one identifier per line
        Value::Array(rows) => {
            for row in rows {
                match row.get("scenario") {
                    Some(name) => println!("{}", format_minimal(name)),
                    None => println!("{}", format_minimal(row)),
                }
            }
        }
        Value::Object(map) => {
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
            }
        }
        other => println!("{}", format_minimal(other)),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

use serde_json::Value;

/// Print just the headline figure from the output.
///
/// Looks for well-known result fields in order of priority, then falls back to the first
/// field in the result object. A comparison prints one line per step.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "total_lcoe",
        "wacc_nominal_blend",
        "pv_capex_soc",
        "sum",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some(Value::Array(steps)) = map.get("steps") {
            for step in steps {
                if let (Some(n), Some(total)) = (step.get("step"), step.get("total_lcoe")) {
                    println!("step {}: {}", format_minimal(n), format_minimal(total));
                }
            }
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
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

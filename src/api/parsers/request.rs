use serde_json::Value;

/// Reads an integer from a JSON number or a numeric string.
///
/// Fractional numbers are rejected rather than truncated.
pub fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Rounds a presented rating to two decimals.
pub fn round_rating(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer(&json!(7)), Some(7));
        assert_eq!(parse_integer(&json!("12")), Some(12));
        assert_eq!(parse_integer(&json!(" 3 ")), Some(3));
        assert_eq!(parse_integer(&json!(2.5)), None);
        assert_eq!(parse_integer(&json!("abc")), None);
        assert_eq!(parse_integer(&json!(null)), None);
        assert_eq!(parse_integer(&json!(true)), None);
    }

    #[test]
    fn test_round_rating() {
        assert_eq!(round_rating(4.256), 4.26);
        assert_eq!(round_rating(5.0), 5.0);
    }
}

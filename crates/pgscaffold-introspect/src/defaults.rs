use std::sync::OnceLock;

use pgscaffold_core::DefaultValue;
use regex::Regex;

/// Normalize a raw catalog default expression.
///
/// Enclosing parentheses and type casts are stripped (repeatedly, so
/// `('now'::text)::date` reduces to `now`), then surrounding quotes. The
/// remaining text is classified in this order: boolean, integer, float,
/// `null`, time function, sequence call, and finally an opaque string.
/// Absent, blank and `null` defaults yield `None`.
pub fn parse_default(raw: Option<&str>) -> Option<DefaultValue> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let value = strip_quotes(&strip_casts(raw));
    classify(&value)
}

fn classify(value: &str) -> Option<DefaultValue> {
    let lower = value.to_ascii_lowercase();

    match lower.as_str() {
        "true" | "t" => return Some(DefaultValue::Boolean(true)),
        "false" | "f" => return Some(DefaultValue::Boolean(false)),
        _ => {}
    }

    if let Ok(integer) = value.parse::<i64>() {
        return Some(DefaultValue::Integer(integer));
    }

    if is_integer_literal(value) {
        return Some(DefaultValue::BigInteger(value.to_string()));
    }

    if value.chars().any(|ch| ch.is_ascii_digit()) {
        if let Ok(float) = value.parse::<f64>() {
            return Some(DefaultValue::Float(float));
        }
    }

    if lower == "null" {
        return None;
    }

    match function_name(&lower) {
        "now" | "current_timestamp" => return Some(DefaultValue::CurrentTimestamp),
        "current_date" => return Some(DefaultValue::CurrentDate),
        "current_time" => return Some(DefaultValue::CurrentTime),
        _ => {}
    }

    if lower.starts_with("nextval(") {
        return Some(DefaultValue::Sequence {
            name: sequence_name(value),
        });
    }

    Some(DefaultValue::String(value.to_string()))
}

fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit())
}

/// `now()`, `now` and `current_timestamp(6)` all reduce to their bare name.
fn function_name(lower: &str) -> &str {
    match lower.find('(') {
        Some(idx) if lower.ends_with(')') => {
            let args = &lower[idx + 1..lower.len() - 1];
            if args.chars().all(|ch| ch.is_ascii_digit() || ch.is_whitespace()) {
                lower[..idx].trim_end()
            } else {
                lower
            }
        }
        _ => lower,
    }
}

fn sequence_name(value: &str) -> String {
    let inner = match (value.find('('), value.rfind(')')) {
        (Some(start), Some(end)) if end > start => &value[start + 1..end],
        _ => value,
    };
    strip_quotes(&strip_casts(inner))
}

fn cast_suffix() -> Option<&'static Regex> {
    static CAST: OnceLock<Option<Regex>> = OnceLock::new();
    CAST.get_or_init(|| {
        Regex::new(r#"::\s*[\w\s."\[\]]+(\(\s*\d+\s*(,\s*\d+\s*)?\))?(\[\])?$"#).ok()
    })
    .as_ref()
}

fn strip_casts(raw: &str) -> String {
    let mut value = raw.trim().to_string();
    loop {
        let before = value.clone();
        value = strip_enclosing_parens(&value);
        if let Some(cast) = cast_suffix() {
            value = cast.replace(&value, "").trim().to_string();
        }
        if value == before {
            return value;
        }
    }
}

/// Remove one pair of parentheses when they enclose the whole expression.
fn strip_enclosing_parens(value: &str) -> String {
    let trimmed = value.trim();
    if !(trimmed.starts_with('(') && trimmed.ends_with(')')) {
        return trimmed.to_string();
    }

    let mut depth = 0_i32;
    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && idx != trimmed.len() - 1 {
                    return trimmed.to_string();
                }
            }
            _ => {}
        }
    }

    trimmed[1..trimmed.len() - 1].trim().to_string()
}

fn strip_quotes(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() >= 2 {
        if trimmed.starts_with('\'') && trimmed.ends_with('\'') {
            return trimmed[1..trimmed.len() - 1].replace("''", "'");
        }
        if trimmed.starts_with('"') && trimmed.ends_with('"') {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_null_defaults_are_none() {
        assert_eq!(parse_default(None), None);
        assert_eq!(parse_default(Some("   ")), None);
        assert_eq!(parse_default(Some("NULL")), None);
        assert_eq!(parse_default(Some("NULL::character varying")), None);
    }

    #[test]
    fn classifies_literals() {
        assert_eq!(parse_default(Some("42")), Some(DefaultValue::Integer(42)));
        assert_eq!(parse_default(Some("(-1)")), Some(DefaultValue::Integer(-1)));
        assert_eq!(
            parse_default(Some("'0'::integer")),
            Some(DefaultValue::Integer(0))
        );
        assert_eq!(
            parse_default(Some("0.5::numeric(10,2)")),
            Some(DefaultValue::Float(0.5))
        );
        assert_eq!(
            parse_default(Some("TRUE")),
            Some(DefaultValue::Boolean(true))
        );
        assert_eq!(parse_default(Some("f")), Some(DefaultValue::Boolean(false)));
    }

    #[test]
    fn integers_beyond_i64_keep_their_digits() {
        assert_eq!(
            parse_default(Some("'12345678901234567890'::numeric")),
            Some(DefaultValue::BigInteger("12345678901234567890".to_string()))
        );
        assert_eq!(
            parse_default(Some("(-99999999999999999999)::bigint")),
            Some(DefaultValue::BigInteger("-99999999999999999999".to_string()))
        );
        assert_eq!(
            parse_default(Some("9223372036854775807")),
            Some(DefaultValue::Integer(i64::MAX))
        );
    }

    #[test]
    fn strips_casts_and_quotes_from_strings() {
        assert_eq!(
            parse_default(Some("'active'::text")),
            Some(DefaultValue::String("active".to_string()))
        );
        assert_eq!(
            parse_default(Some("'pending'::character varying")),
            Some(DefaultValue::String("pending".to_string()))
        );
        assert_eq!(
            parse_default(Some("'it''s'::text")),
            Some(DefaultValue::String("it's".to_string()))
        );
        assert_eq!(
            parse_default(Some("'{}'::jsonb")),
            Some(DefaultValue::String("{}".to_string()))
        );
        assert_eq!(
            parse_default(Some("''::text")),
            Some(DefaultValue::String(String::new()))
        );
    }

    #[test]
    fn recognizes_time_functions() {
        assert_eq!(
            parse_default(Some("now()")),
            Some(DefaultValue::CurrentTimestamp)
        );
        assert_eq!(
            parse_default(Some("CURRENT_TIMESTAMP")),
            Some(DefaultValue::CurrentTimestamp)
        );
        assert_eq!(
            parse_default(Some("CURRENT_TIMESTAMP(6)")),
            Some(DefaultValue::CurrentTimestamp)
        );
        assert_eq!(
            parse_default(Some("('now'::text)::date")),
            Some(DefaultValue::CurrentTimestamp)
        );
        assert_eq!(
            parse_default(Some("CURRENT_DATE")),
            Some(DefaultValue::CurrentDate)
        );
        assert_eq!(
            parse_default(Some("current_time")),
            Some(DefaultValue::CurrentTime)
        );
    }

    #[test]
    fn recognizes_sequences() {
        assert_eq!(
            parse_default(Some("nextval('users_id_seq'::regclass)")),
            Some(DefaultValue::Sequence {
                name: "users_id_seq".to_string()
            })
        );
    }

    #[test]
    fn unknown_function_calls_fall_back_to_string() {
        assert_eq!(
            parse_default(Some("gen_random_uuid()")),
            Some(DefaultValue::String("gen_random_uuid()".to_string()))
        );
        assert_eq!(
            parse_default(Some("'infinity'::timestamp")),
            Some(DefaultValue::String("infinity".to_string()))
        );
    }
}

//! The weighted SQL/NoSQL structural signal table (§4.D).
//!
//! Each signal is evaluated independently against the raw bytes/text of a
//! non-media file and contributes points to exactly one of the two scores.
//! The table mirrors the spec's literal point values; nothing here is tuned.

use serde_json::Value;

#[derive(Clone, Debug)]
pub struct SignalHit {
    pub name: &'static str,
    pub sql_points: i32,
    pub nosql_points: i32,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct ScoreCard {
    pub sql: i32,
    pub nosql: i32,
    pub hits: Vec<SignalHit>,
}

impl ScoreCard {
    fn push(&mut self, name: &'static str, sql_points: i32, nosql_points: i32, reason: impl Into<String>) {
        self.sql += sql_points;
        self.nosql += nosql_points;
        self.hits.push(SignalHit {
            name,
            sql_points,
            nosql_points,
            reason: reason.into(),
        });
    }

    pub fn confidence(&self) -> f64 {
        let denom = self.sql.max(self.nosql).max(1) as f64;
        (self.sql - self.nosql).unsigned_abs() as f64 / denom
    }

    /// Ties break to SQL (§4.D).
    pub fn is_sql(&self) -> bool {
        self.sql >= self.nosql
    }
}

/// Tabular formats (CSV) score purely SQL; recognized by extension, the
/// caller is responsible for separating tabular from other text extensions.
pub fn score_tabular(card: &mut ScoreCard, record_count: usize) {
    card.push("tabular_format", 5, 0, format!("parsed as tabular with {record_count} records"));
}

pub fn score_html(card: &mut ScoreCard, html: &str) {
    let has_table = html.contains("<table") || html.contains("<TABLE");
    if has_table {
        card.push("html_table", 3, 0, "well-formed <table> element present");
    } else {
        card.push("html_no_table", 0, 1, "no <table> element found");
    }
}

pub fn score_xml(card: &mut ScoreCard, depth: usize, repeating_same_shape: bool) {
    if repeating_same_shape {
        card.push("xml_repeating_records", 3, 0, "repeating same-shape XML elements");
    }
    if depth > 2 {
        card.push("xml_deep", 0, 3, format!("XML nesting depth {depth} > 2"));
    }
}

pub fn score_plain_text(card: &mut ScoreCard) {
    card.push("plain_text", 0, 3, "pure free-text content (.txt/.md/.log or document body)");
}

/// Scores a parsed JSON value. Handles both a single object/array-of-objects
/// document and arbitrarily nested values.
pub fn score_json(card: &mut ScoreCard, value: &Value) {
    match value {
        Value::Array(items) if !items.is_empty() && items.iter().all(|v| v.is_object()) => {
            let shapes: Vec<Vec<&str>> = items
                .iter()
                .map(|v| {
                    let mut keys: Vec<&str> = v.as_object().unwrap().keys().map(|k| k.as_str()).collect();
                    keys.sort_unstable();
                    keys
                })
                .collect();
            let consistent = shapes.windows(2).all(|w| w[0] == w[1]);
            if consistent {
                card.push("json_array_consistent_shape", 4, 0, "JSON array elements share identical key sets");
                card.push("schema_consistent", 2, 0, "schema consistent across records");
            } else {
                card.push("json_array_inconsistent_shape", 0, 3, "JSON array elements have differing key sets");
                card.push("keys_vary", 0, 2, "keys vary per record");
            }
            for item in items {
                score_object_fields(card, item);
            }
        }
        Value::Object(_) => score_object_fields(card, value),
        _ => {}
    }
}

fn score_object_fields(card: &mut ScoreCard, value: &Value) {
    let Value::Object(map) = value else { return };

    let has_nested = map.values().any(|v| v.is_object() || v.is_array());
    if has_nested {
        card.push("json_nested_objects", 0, 4, "object contains nested object/array values");
    } else {
        card.push("json_flat", 4, 0, "flat JSON object with no nested values");
    }

    let primitive_count = map.values().filter(|v| v.is_string() || v.is_number() || v.is_boolean() || v.is_null()).count();
    if !map.is_empty() && primitive_count * 2 >= map.len() {
        card.push("mostly_primitive", 1, 0, "majority of fields are primitive values");
    }

    if map.keys().any(|k| k.ends_with("_id")) {
        card.push("id_fields", 1, 0, "at least one field named *_id");
    }

    if map.values().any(|v| matches!(v, Value::String(s) if s.len() >= 200)) {
        card.push("large_free_text", 0, 2, "a string field is ≥ 200 chars long");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_json_array_with_consistent_shape_scores_sql() {
        let mut card = ScoreCard::default();
        let value = json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]);
        score_json(&mut card, &value);
        assert!(card.is_sql());
        assert!(card.sql >= 8);
    }

    #[test]
    fn nested_json_object_scores_nosql() {
        let mut card = ScoreCard::default();
        let value = json!({"user": {"name": "a", "addr": {"city": "x"}}});
        score_json(&mut card, &value);
        assert!(!card.is_sql());
        assert!(card.nosql >= 4);
    }

    #[test]
    fn adding_nested_object_never_decreases_nosql_or_increases_sql() {
        let flat = json!({"id": 1, "name": "a"});
        let mut flat_card = ScoreCard::default();
        score_json(&mut flat_card, &flat);

        let nested = json!({"id": 1, "name": "a", "addr": {"city": "x"}});
        let mut nested_card = ScoreCard::default();
        score_json(&mut nested_card, &nested);

        assert!(nested_card.nosql >= flat_card.nosql);
        assert!(nested_card.sql <= flat_card.sql);
    }

    #[test]
    fn ties_break_to_sql() {
        let card = ScoreCard { sql: 3, nosql: 3, hits: vec![] };
        assert!(card.is_sql());
    }
}

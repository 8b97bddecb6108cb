// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Undo a single layer of JSON-style regex escaping in `pattern` fields.
//!
//! Canonical schemas are authored as YAML. Many regex patterns were written
//! with JSON-style escaping (`\\d`), which YAML preserves literally —
//! producing a pattern that matches a backslash followed by the letter `d`
//! instead of a digit. Collapsing `\\` to `\` in fields literally named
//! `pattern` restores the intended regex.

use serde_json::Value;

pub(crate) fn normalize_regex_patterns(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if key == "pattern" {
                    if let Value::String(s) = v {
                        *s = s.replace("\\\\", "\\");
                    }
                    continue;
                }
                normalize_regex_patterns(v);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                normalize_regex_patterns(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collapses_doubled_backslash_in_pattern_fields_only() {
        let mut value = json!({
            "pattern": "^\\\\d+$",
            "nested": {"pattern": "\\\\w"},
            "other": "\\\\d",
        });
        normalize_regex_patterns(&mut value);
        assert_eq!(value["pattern"], "^\\d+$");
        assert_eq!(value["nested"]["pattern"], "\\w");
        assert_eq!(value["other"], "\\\\d");
    }

    #[test]
    fn descends_into_arrays() {
        let mut value = json!({"allOf": [{"pattern": "a\\\\b"}]});
        normalize_regex_patterns(&mut value);
        assert_eq!(value["allOf"][0]["pattern"], "a\\b");
    }
}

//! Deterministic JSON rendering for diagnostics and CLI output.
//!
//! `canonicalize` produces sorted-key, 2-space-indented JSON that is stable
//! across differently ordered inputs. `pretty_print` renders the same sorted
//! data as an aligned, YAML-like tree meant for humans only.

use colored::Colorize;
use serde_json::{Map, Value};

const INDENT: usize = 2;
const EMPTY_ARRAY: &str = "(empty array)";
const EMPTY_OBJECT: &str = "(empty object)";

/// Sorted-key JSON with 2-space indentation.
pub fn canonicalize(value: &Value) -> String {
    format!("{:#}", sorted(value))
}

/// Plain tree rendering with sorted keys.
pub fn pretty_print(value: &Value) -> String {
    Tree { color: false }.render(&sorted(value))
}

/// Tree rendering with terminal colors.
pub fn pretty_print_colored(value: &Value) -> String {
    Tree { color: true }.render(&sorted(value))
}

/// Rebuilds every object with its keys in lexicographic order, independent
/// of how `serde_json::Map` orders entries.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

struct Tree {
    color: bool,
}

impl Tree {
    fn render(&self, value: &Value) -> String {
        let mut lines = Vec::new();
        self.node(value, 0, &mut lines);
        lines.join("\n")
    }

    fn node(&self, value: &Value, indent: usize, lines: &mut Vec<String>) {
        let pad = " ".repeat(indent);
        match value {
            Value::Array(items) if items.is_empty() => lines.push(format!("{pad}{EMPTY_ARRAY}")),
            Value::Object(map) if map.is_empty() => lines.push(format!("{pad}{EMPTY_OBJECT}")),
            Value::Array(items) => {
                for item in items {
                    let dash = self.dash();
                    match self.inline(item) {
                        Some(scalar) => lines.push(format!("{pad}{dash}{scalar}")),
                        None => {
                            lines.push(format!("{pad}{dash}").trim_end().to_string());
                            self.node(item, indent + INDENT, lines);
                        }
                    }
                }
            }
            Value::Object(map) => {
                let width = map.keys().map(|k| k.chars().count()).max().unwrap_or(0);
                for (key, item) in map {
                    let label = self.key(key);
                    match self.inline(item) {
                        Some(scalar) => {
                            let gap = " ".repeat(width - key.chars().count());
                            lines.push(format!("{pad}{label}: {gap}{scalar}"));
                        }
                        None => {
                            lines.push(format!("{pad}{label}:"));
                            self.node(item, indent + INDENT, lines);
                        }
                    }
                }
            }
            Value::String(text) if text.contains('\n') => {
                lines.push(format!("{pad}\"\"\""));
                for line in text.split('\n') {
                    lines.push(format!("{pad}{}{line}", " ".repeat(INDENT)));
                }
                lines.push(format!("{pad}\"\"\""));
            }
            scalar => {
                let text = self.inline(scalar).unwrap_or_default();
                lines.push(format!("{pad}{text}"));
            }
        }
    }

    /// Scalars that fit on one line; `None` for containers and multi-line
    /// strings.
    fn inline(&self, value: &Value) -> Option<String> {
        match value {
            Value::Null => Some(self.paint("null", |s| s.dimmed().to_string())),
            Value::Bool(b) => Some(self.paint(&b.to_string(), |s| s.yellow().to_string())),
            Value::Number(n) => Some(self.paint(&n.to_string(), |s| s.blue().to_string())),
            Value::String(text) if !text.contains('\n') => Some(text.clone()),
            _ => None,
        }
    }

    fn key(&self, key: &str) -> String {
        self.paint(key, |s| s.green().to_string())
    }

    fn dash(&self) -> String {
        self.paint("- ", |s| s.green().to_string())
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> String) -> String {
        if self.color {
            style(text)
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonicalize_is_independent_of_key_order() {
        let a: Value = serde_json::from_str(r#"{"b":1,"a":{"z":true,"y":[{"d":1,"c":2}]}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a":{"y":[{"c":2,"d":1}],"z":true},"b":1}"#).unwrap();
        assert_eq!(canonicalize(&a), canonicalize(&b));
        assert_eq!(canonicalize(&a), canonicalize(&a));
    }

    #[test]
    fn canonicalize_sorts_and_indents() {
        let value = json!({"title": "Hi", "id": "x", "tags": [2, 1]});
        let expected = "{\n  \"id\": \"x\",\n  \"tags\": [\n    2,\n    1\n  ],\n  \"title\": \"Hi\"\n}";
        assert_eq!(canonicalize(&value), expected);
    }

    #[test]
    fn canonicalize_keeps_scalars() {
        assert_eq!(canonicalize(&json!(null)), "null");
        assert_eq!(canonicalize(&json!("x")), "\"x\"");
    }

    #[test]
    fn pretty_print_aligns_scalar_values() {
        let value = json!({
            "version": "1.2.0",
            "hello": "readinglist",
            "documentation": "https://readinglist.readthedocs.org/"
        });
        let expected = "\
documentation: https://readinglist.readthedocs.org/
hello:         readinglist
version:       1.2.0";
        assert_eq!(pretty_print(&value), expected);
    }

    #[test]
    fn pretty_print_nests_arrays_and_objects() {
        let value = json!({
            "items": [{"id": "a", "unread": true}, "loose"],
            "empty": [],
            "meta": {}
        });
        let expected = "\
empty:
  (empty array)
items:
  -
    id:     a
    unread: true
  - loose
meta:
  (empty object)";
        assert_eq!(pretty_print(&value), expected);
    }

    #[test]
    fn pretty_print_renders_multiline_strings_as_blocks() {
        let value = json!({"excerpt": "line one\nline two"});
        let expected = "excerpt:\n  \"\"\"\n    line one\n    line two\n  \"\"\"";
        assert_eq!(pretty_print(&value), expected);
    }

    #[test]
    fn multiline_block_keeps_trailing_empty_lines() {
        let value = json!({"note": "a\n\n"});
        let expected = "note:\n  \"\"\"\n    a\n    \n    \n  \"\"\"";
        assert_eq!(pretty_print(&value), expected);
    }

    #[test]
    fn pretty_print_handles_top_level_scalars() {
        assert_eq!(pretty_print(&json!(42)), "42");
        assert_eq!(pretty_print(&json!(null)), "null");
    }

    #[test]
    fn colored_output_keeps_the_text() {
        colored::control::set_override(true);
        let rendered = pretty_print_colored(&json!({"database": true}));
        colored::control::unset_override();
        assert!(rendered.contains("database"));
        assert!(rendered.contains("true"));
        assert!(rendered.contains('\u{1b}'));
    }
}

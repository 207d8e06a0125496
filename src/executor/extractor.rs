//! Value-path extraction over JSON response bodies.
//!
//! Supported syntax: optional `$` root, `.key`, `['key']` / `["key"]`,
//! `[index]` (negative counts from the end), `[*]` / `.*` wildcards and
//! `..key` / `..*` recursive descent. A path that does not start with `$`
//! is read relative to the root, so `a.b` and `$.a.b` are equivalent.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("unexpected character {found:?} at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("unterminated {0}")]
    Unterminated(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
enum Selector {
    Key(String),
    Index(i64),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Child(Selector),
    Descendant(Selector),
}

/// Compiled value path
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let chars: Vec<char> = path.chars().collect();
        let mut pos = 0;
        if chars[0] == '$' {
            pos = 1;
        } else if chars[0] != '.' && chars[0] != '[' {
            // bare leading key
            let key = read_key(&chars, &mut pos);
            if key.is_empty() {
                return Err(PathError::Unexpected { found: chars[0], offset: 0 });
            }
            return Self::parse_rest(&chars, pos, vec![Segment::Child(Selector::Key(key))]);
        }

        Self::parse_rest(&chars, pos, Vec::new())
    }

    fn parse_rest(chars: &[char], mut pos: usize, mut segments: Vec<Segment>) -> Result<Self, PathError> {
        while pos < chars.len() {
            match chars[pos] {
                '.' if chars.get(pos + 1) == Some(&'.') => {
                    pos += 2;
                    let selector = match chars.get(pos) {
                        Some('[') => read_bracket(chars, &mut pos)?,
                        Some('*') => {
                            pos += 1;
                            Selector::Wildcard
                        }
                        _ => dotted_key(chars, &mut pos)?,
                    };
                    segments.push(Segment::Descendant(selector));
                }
                '.' => {
                    pos += 1;
                    let selector = if chars.get(pos) == Some(&'*') {
                        pos += 1;
                        Selector::Wildcard
                    } else {
                        dotted_key(chars, &mut pos)?
                    };
                    segments.push(Segment::Child(selector));
                }
                '[' => {
                    let selector = read_bracket(chars, &mut pos)?;
                    segments.push(Segment::Child(selector));
                }
                other => return Err(PathError::Unexpected { found: other, offset: pos }),
            }
        }

        Ok(Self { segments })
    }

    /// True when the path can match at most one value
    pub fn is_definite(&self) -> bool {
        self.segments.iter().all(|s| {
            matches!(s, Segment::Child(Selector::Key(_)) | Segment::Child(Selector::Index(_)))
        })
    }

    /// All matches in document order
    pub fn select<'v>(&self, root: &'v Value) -> Vec<&'v Value> {
        let mut current = vec![root];
        for segment in &self.segments {
            let mut next = Vec::new();
            for node in current {
                match segment {
                    Segment::Child(selector) => apply(selector, node, &mut next),
                    Segment::Descendant(selector) => {
                        let mut nodes = Vec::new();
                        descendants(node, &mut nodes);
                        for n in nodes {
                            apply(selector, n, &mut next);
                        }
                    }
                }
            }
            current = next;
        }
        current
    }
}

fn read_key(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && !matches!(chars[*pos], '.' | '[') {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn dotted_key(chars: &[char], pos: &mut usize) -> Result<Selector, PathError> {
    let key = read_key(chars, pos);
    if key.is_empty() {
        return match chars.get(*pos) {
            Some(c) => Err(PathError::Unexpected { found: *c, offset: *pos }),
            None => Err(PathError::Unterminated("member name")),
        };
    }
    Ok(Selector::Key(key))
}

fn read_bracket(chars: &[char], pos: &mut usize) -> Result<Selector, PathError> {
    // skip '['
    *pos += 1;
    let selector = match chars.get(*pos) {
        Some(quote @ ('\'' | '"')) => {
            let quote = *quote;
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != quote {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return Err(PathError::Unterminated("quoted key"));
            }
            let key: String = chars[start..*pos].iter().collect();
            *pos += 1;
            Selector::Key(key)
        }
        Some('*') => {
            *pos += 1;
            Selector::Wildcard
        }
        Some(_) => {
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != ']' {
                *pos += 1;
            }
            let raw: String = chars[start..*pos].iter().collect();
            let index = raw.trim().parse::<i64>().map_err(|_| PathError::Unexpected {
                found: chars[start],
                offset: start,
            })?;
            Selector::Index(index)
        }
        None => return Err(PathError::Unterminated("bracket")),
    };

    match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            Ok(selector)
        }
        Some(c) => Err(PathError::Unexpected { found: *c, offset: *pos }),
        None => Err(PathError::Unterminated("bracket")),
    }
}

fn apply<'v>(selector: &Selector, node: &'v Value, out: &mut Vec<&'v Value>) {
    match (selector, node) {
        (Selector::Key(key), Value::Object(map)) => out.extend(map.get(key)),
        (Selector::Index(index), Value::Array(items)) => {
            let len = items.len() as i64;
            let resolved = if *index < 0 { len + index } else { *index };
            if (0..len).contains(&resolved) {
                out.push(&items[resolved as usize]);
            }
        }
        (Selector::Wildcard, Value::Object(map)) => out.extend(map.values()),
        (Selector::Wildcard, Value::Array(items)) => out.extend(items.iter()),
        _ => {}
    }
}

fn descendants<'v>(node: &'v Value, out: &mut Vec<&'v Value>) {
    out.push(node);
    match node {
        Value::Object(map) => map.values().for_each(|v| descendants(v, out)),
        Value::Array(items) => items.iter().for_each(|v| descendants(v, out)),
        _ => {}
    }
}

/// Text form of an extracted value: strings raw, other scalars as JSON text,
/// containers as compact JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Applies `path` to the JSON `body`. Any parse failure or a definite path with
/// no match yields `None`; wildcard and recursive paths yield a JSON array.
pub fn extract_value(body: &str, path: &str) -> Option<String> {
    let document: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("value extraction skipped, body is not JSON: {}", e);
            return None;
        }
    };

    let compiled = match JsonPath::parse(path) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("invalid value path {:?}: {}", path, e);
            return None;
        }
    };

    let matches = compiled.select(&document);
    if compiled.is_definite() {
        let Some(value) = matches.first() else {
            tracing::warn!("value path {:?} matched nothing", path);
            return None;
        };
        Some(render_value(value))
    } else {
        let collected = Value::Array(matches.into_iter().cloned().collect());
        Some(render_value(&collected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_number_renders_as_text() {
        let body = r#"{"a":{"b":42}}"#;
        assert_eq!(extract_value(body, "$.a.b").as_deref(), Some("42"));
        assert_eq!(extract_value(body, "a.b").as_deref(), Some("42"));
        assert_eq!(extract_value(body, "$['a']['b']").as_deref(), Some("42"));
    }

    #[test]
    fn scalars_and_containers() {
        let body = r#"{"name":"svc","ok":true,"none":null,"items":[{"id":1},{"id":2}]}"#;
        assert_eq!(extract_value(body, "$.name").as_deref(), Some("svc"));
        assert_eq!(extract_value(body, "$.ok").as_deref(), Some("true"));
        assert_eq!(extract_value(body, "$.none").as_deref(), Some("null"));
        assert_eq!(extract_value(body, "$.items[0]").as_deref(), Some(r#"{"id":1}"#));
        assert_eq!(extract_value(body, "$.items[-1].id").as_deref(), Some("2"));
    }

    #[test]
    fn wildcard_and_recursive_paths_collect_arrays() {
        let body = r#"{"items":[{"id":1},{"id":2}],"meta":{"id":9}}"#;
        assert_eq!(extract_value(body, "$.items[*].id").as_deref(), Some("[1,2]"));
        assert_eq!(extract_value(body, "$..id").as_deref(), Some("[1,2,9]"));
    }

    #[test]
    fn failures_yield_no_value() {
        assert_eq!(extract_value("not json", "$.a"), None);
        assert_eq!(extract_value(r#"{"a":1}"#, "$.missing"), None);
        assert_eq!(extract_value(r#"{"a":1}"#, "$.a["), None);
        assert_eq!(extract_value(r#"[1]"#, "$[5]"), None);
    }

    #[test]
    fn parser_rejects_malformed_paths() {
        assert_eq!(JsonPath::parse("  "), Err(PathError::Empty));
        assert!(JsonPath::parse("$['open").is_err());
        assert!(JsonPath::parse("$.").is_err());
        assert!(JsonPath::parse("$[x]").is_err());
        assert!(JsonPath::parse("$.a").unwrap().is_definite());
        assert!(!JsonPath::parse("$..a").unwrap().is_definite());
    }

    #[test]
    fn root_path_returns_whole_document() {
        let doc = json!({ "k": [1, 2] });
        let path = JsonPath::parse("$").unwrap();
        assert_eq!(path.select(&doc), vec![&doc]);
    }
}

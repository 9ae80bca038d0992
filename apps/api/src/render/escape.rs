//! LaTeX escaping for user-supplied text.
//!
//! Applied exactly once, after normalization and before rendering. Escaping is
//! not idempotent: a second pass would escape the backslashes of the first.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Escapes every LaTeX-significant character in `text` so it typesets literally.
///
/// Single pass over the input, so the backslashes introduced by one escape are
/// never re-escaped by another.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '\\' => out.push_str(r"\textbackslash{}"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes every string leaf of `value`. Keys, array order and length, and
/// non-string leaves are left untouched.
pub fn escape_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(escape_latex(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(escape_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, escape_value(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Escapes every string field of a typed record, keeping its type.
pub fn escape_record<T>(record: &T) -> serde_json::Result<T>
where
    T: Serialize + DeserializeOwned,
{
    serde_json::from_value(escape_value(serde_json::to_value(record)?))
}

/// Makes a URL safe as the first argument of `\href`.
///
/// Unlike `escape_latex` the link target stays a usable URL: braces, backslashes
/// and whitespace are percent-encoded, then `%` and `#` get a backslash.
pub fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.trim().chars() {
        match ch {
            '{' => out.push_str(r"\%7B"),
            '}' => out.push_str(r"\%7D"),
            '\\' => out.push_str(r"\%5C"),
            c if c.is_whitespace() => out.push_str(r"\%20"),
            '%' | '#' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SPECIALS: [char; 10] = ['&', '%', '$', '#', '_', '{', '}', '~', '^', '\\'];

    /// Walks escaped output and reports the first special character that is
    /// not part of an escape sequence.
    fn first_unescaped(escaped: &str) -> Option<char> {
        const WORD_ESCAPES: [&str; 3] = [
            r"\textasciitilde{}",
            r"\textasciicircum{}",
            r"\textbackslash{}",
        ];
        let mut rest = escaped;
        while let Some(ch) = rest.chars().next() {
            if ch == '\\' {
                if let Some(word) = WORD_ESCAPES.iter().find(|w| rest.starts_with(**w)) {
                    rest = &rest[word.len()..];
                    continue;
                }
                match rest[1..].chars().next() {
                    Some(next) if "&%$#_{}".contains(next) => {
                        rest = &rest[1 + next.len_utf8()..];
                        continue;
                    }
                    _ => return Some('\\'),
                }
            }
            if SPECIALS.contains(&ch) {
                return Some(ch);
            }
            rest = &rest[ch.len_utf8()..];
        }
        None
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(escape_latex("R&D"), r"R\&D");
        assert_eq!(escape_latex("100%"), r"100\%");
        assert_eq!(escape_latex("$5"), r"\$5");
        assert_eq!(escape_latex("C#"), r"C\#");
        assert_eq!(escape_latex("snake_case"), r"snake\_case");
        assert_eq!(escape_latex("{x}"), r"\{x\}");
    }

    #[test]
    fn test_word_escapes() {
        assert_eq!(escape_latex("~/bin"), r"\textasciitilde{}/bin");
        assert_eq!(escape_latex("2^10"), r"2\textasciicircum{}10");
        assert_eq!(escape_latex(r"C:\Users"), r"C:\textbackslash{}Users");
    }

    #[test]
    fn test_backslash_is_not_double_escaped() {
        let escaped = escape_latex(r"a\b");
        assert_eq!(escaped, r"a\textbackslash{}b");
        assert!(!escaped.contains(r"\textbackslash\{\}"));
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(escape_latex("Senior Engineer, Zürich"), "Senior Engineer, Zürich");
        assert_eq!(escape_latex(""), "");
    }

    #[test]
    fn test_no_special_character_survives_unescaped() {
        let inputs = [
            r"& % $ # _ { } ~ ^ \",
            r"\\\\",
            r"{{name}}",
            r"\textbf{bold}",
            "50% of $1M_budget #1 ~approx^2 {set} & more",
            r"trailing\",
        ];
        for input in inputs {
            let escaped = escape_latex(input);
            assert_eq!(first_unescaped(&escaped), None, "input {input:?} -> {escaped:?}");
        }
    }

    #[test]
    fn test_scanner_flags_raw_specials() {
        assert_eq!(first_unescaped("a_b"), Some('_'));
        assert_eq!(first_unescaped(r"\textbf"), Some('\\'));
    }

    #[test]
    fn test_escape_value_preserves_shape() {
        let input = json!({
            "name": "A&B",
            "count": 3,
            "flag": true,
            "missing": null,
            "items": ["x_y", "plain", 7],
            "nested": { "inner": ["#1"] }
        });
        let escaped = escape_value(input);
        assert_eq!(
            escaped,
            json!({
                "name": r"A\&B",
                "count": 3,
                "flag": true,
                "missing": null,
                "items": [r"x\_y", "plain", 7],
                "nested": { "inner": [r"\#1"] }
            })
        );
    }

    #[test]
    fn test_keys_are_not_escaped() {
        let escaped = escape_value(json!({ "has_skills": "a_b" }));
        assert_eq!(escaped["has_skills"], json!(r"a\_b"));
    }

    #[test]
    fn test_escape_record_keeps_type() {
        #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
        struct Entry {
            title: String,
            tags: Vec<String>,
            shown: bool,
        }

        let escaped = escape_record(&Entry {
            title: "R&D".to_string(),
            tags: vec!["C#".to_string()],
            shown: true,
        })
        .unwrap();

        assert_eq!(
            escaped,
            Entry {
                title: r"R\&D".to_string(),
                tags: vec![r"C\#".to_string()],
                shown: true,
            }
        );
    }

    #[test]
    fn test_url_keeps_tilde_and_underscore() {
        assert_eq!(
            escape_url("https://github.com/~bob_x/"),
            "https://github.com/~bob_x/"
        );
    }

    #[test]
    fn test_url_escapes_percent_and_hash() {
        assert_eq!(
            escape_url("https://example.com/a%20b#top"),
            r"https://example.com/a\%20b\#top"
        );
    }

    #[test]
    fn test_url_percent_encodes_tex_grouping() {
        assert_eq!(escape_url(r"https://x.io/{a}\b c"), r"https://x.io/\%7Ba\%7D\%5Cb\%20c");
    }
}

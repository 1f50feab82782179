//! Front-matter generators, one per [`Dialect`].
//!
//! # Header layout
//!
//! | Dialect        | Fields, in order                                              |
//! |----------------|---------------------------------------------------------------|
//! | `always-apply` | `description`, `alwaysApply`, `globs`, extras sorted by key   |
//! | `apply-to`     | `description`, `applyTo` (`**` when blank), extras sorted     |
//! | `passthrough`  | none, body only                                              |
//!
//! Only `rules` artifacts get a header; every other kind is copied as is.

use std::borrow::Cow;
use std::fmt::Write as _;

use syncai_core::{Dialect, Kind};

use crate::metadata::{is_reserved, RulesMetadata, ALWAYS_GLOBS};

const DELIMITER: &str = "---\n";

/// Characters that make a plain YAML scalar ambiguous.
const YAML_SIGNIFICANT: &[char] = &[
    ' ', '"', ':', '{', '}', '[', ']', '#', '&', '*', '!', '|', '>', '\'', '%', '@', '`',
];

/// Render canonical metadata plus a body into an agent's on-disk bytes.
pub trait FrontMatterGenerator {
    /// Header block (delimiters included), or `None` for no header.
    fn header(&self, metadata: &RulesMetadata) -> Option<String>;

    /// Header prefixed verbatim to `body`.
    fn render(&self, metadata: &RulesMetadata, body: &[u8]) -> Vec<u8> {
        match self.header(metadata) {
            Some(header) => {
                let mut out = Vec::with_capacity(header.len() + body.len());
                out.extend_from_slice(header.as_bytes());
                out.extend_from_slice(body);
                out
            }
            None => body.to_vec(),
        }
    }
}

impl FrontMatterGenerator for Dialect {
    fn header(&self, metadata: &RulesMetadata) -> Option<String> {
        let mut out = String::from(DELIMITER);
        match self {
            Dialect::AlwaysApply => {
                push_field(&mut out, "description", &metadata.description);
                let _ = writeln!(out, "alwaysApply: {}", metadata.is_always_apply());
                push_field(&mut out, "globs", &metadata.globs);
            }
            Dialect::ApplyTo => {
                push_field(&mut out, "description", &metadata.description);
                let apply_to = if metadata.globs.trim().is_empty() {
                    ALWAYS_GLOBS
                } else {
                    metadata.globs.as_str()
                };
                push_field(&mut out, "applyTo", apply_to);
            }
            Dialect::Passthrough => return None,
        }
        for (key, value) in &metadata.extra {
            if is_reserved(key) {
                continue;
            }
            push_field(&mut out, key, value);
        }
        out.push_str(DELIMITER);
        Some(out)
    }
}

/// Bytes an agent with `dialect` should hold for an artifact of `kind`.
pub fn render_artifact(
    dialect: Dialect,
    kind: Kind,
    metadata: &RulesMetadata,
    body: &[u8],
) -> Vec<u8> {
    match kind {
        Kind::Rules => dialect.render(metadata, body),
        Kind::Commands | Kind::Context | Kind::Ignore => body.to_vec(),
    }
}

fn push_field(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{key}: {}", quote_scalar(value));
}

/// Quote `value` for use as a YAML scalar when it needs it.
///
/// Empty values become `""`; values already wrapped in matching quotes are
/// left alone; values holding YAML-significant or control characters are
/// double-quoted with escapes. Everything else stays bare.
pub fn quote_scalar(value: &str) -> Cow<'_, str> {
    if value.is_empty() {
        return Cow::Borrowed("\"\"");
    }
    if is_quoted(value) {
        return Cow::Borrowed(value);
    }
    if value
        .chars()
        .any(|c| YAML_SIGNIFICANT.contains(&c) || c.is_control())
    {
        // A JSON string literal is a valid YAML double-quoted scalar.
        let quoted =
            serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.escape_default()));
        return Cow::Owned(quoted);
    }
    Cow::Borrowed(value)
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2
        && ['"', '\''].iter().any(|&q| value.starts_with(q) && value.ends_with(q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn metadata(description: &str, globs: &str, extra: &[(&str, &str)]) -> RulesMetadata {
        RulesMetadata {
            description: description.to_string(),
            globs: globs.to_string(),
            extra: extra
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn render_str(dialect: Dialect, meta: &RulesMetadata, body: &str) -> String {
        String::from_utf8(dialect.render(meta, body.as_bytes())).expect("utf8")
    }

    #[rstest]
    #[case("abc", "abc")]
    #[case("", "\"\"")]
    #[case("\"already\"", "\"already\"")]
    #[case("'single'", "'single'")]
    #[case("x y", "\"x y\"")]
    #[case("**", "\"**\"")]
    #[case("a:b", "\"a:b\"")]
    #[case("say \"hi\"", "\"say \\\"hi\\\"\"")]
    #[case("line\nbreak", "\"line\\nbreak\"")]
    #[case("src/**/*.rs", "\"src/**/*.rs\"")]
    fn quoting(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(quote_scalar(input), expected);
    }

    #[test]
    fn always_apply_dialect_header() {
        let meta = metadata("x y", "**", &[]);
        let out = render_str(Dialect::AlwaysApply, &meta, "body\n");
        assert_eq!(
            out,
            "---\ndescription: \"x y\"\nalwaysApply: true\nglobs: \"**\"\n---\nbody\n"
        );
    }

    #[test]
    fn always_apply_is_false_for_specific_globs() {
        let meta = metadata("d", "src/lib.rs", &[]);
        let out = render_str(Dialect::AlwaysApply, &meta, "");
        assert!(out.contains("alwaysApply: false\n"));
        assert!(out.contains("globs: src/lib.rs\n"));
    }

    #[test]
    fn apply_to_dialect_header() {
        let meta = metadata("x y", "**", &[]);
        let out = render_str(Dialect::ApplyTo, &meta, "body\n");
        assert_eq!(out, "---\ndescription: \"x y\"\napplyTo: \"**\"\n---\nbody\n");
        assert!(!out.contains("alwaysApply"));
    }

    #[test]
    fn apply_to_defaults_blank_globs_to_everything() {
        let meta = metadata("", "", &[]);
        let out = render_str(Dialect::ApplyTo, &meta, "");
        assert_eq!(out, "---\ndescription: \"\"\napplyTo: \"**\"\n---\n");
    }

    #[test]
    fn extras_are_sorted_and_reserved_names_skipped() {
        let meta = metadata("d", "*", &[("zeta", "1"), ("Alpha", "two words"), ("ApplyTo", "x")]);
        let out = render_str(Dialect::AlwaysApply, &meta, "");
        assert_eq!(
            out,
            "---\ndescription: d\nalwaysApply: true\nglobs: \"*\"\nAlpha: \"two words\"\nzeta: 1\n---\n"
        );
    }

    #[test]
    fn passthrough_has_no_header() {
        let meta = metadata("d", "**", &[("k", "v")]);
        assert_eq!(render_str(Dialect::Passthrough, &meta, "body"), "body");
    }

    #[test]
    fn non_rules_kinds_pass_through() {
        let meta = metadata("d", "**", &[]);
        for kind in [Kind::Context, Kind::Ignore, Kind::Commands] {
            assert_eq!(render_artifact(Dialect::AlwaysApply, kind, &meta, b"raw"), b"raw".to_vec());
        }
        assert!(render_artifact(Dialect::AlwaysApply, Kind::Rules, &meta, b"raw").starts_with(b"---\n"));
    }
}

//! Canonical rule metadata merged from every agent's copy of a rule.

use std::collections::BTreeMap;

use crate::document::Document;

/// Field names the dialects interpret themselves; never emitted as extras.
pub const RESERVED_FIELDS: [&str; 4] = ["description", "globs", "applyto", "alwaysapply"];

/// Globs value meaning "always apply".
pub const ALWAYS_GLOBS: &str = "**";

/// Case-insensitive check against [`RESERVED_FIELDS`].
pub fn is_reserved(field: &str) -> bool {
    RESERVED_FIELDS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(field))
}

/// `true`, `1`, `yes`, `on` (any case, surrounding whitespace ignored).
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Merged metadata for one logical rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulesMetadata {
    pub description: String,
    /// Applicability pattern; `**` or `*` mean always apply.
    pub globs: String,
    /// Unreserved fields, sorted by key.
    pub extra: BTreeMap<String, String>,
}

impl RulesMetadata {
    pub fn is_always_apply(&self) -> bool {
        self.globs == "**" || self.globs == "*"
    }

    /// Merge metadata from `documents`, given oldest first.
    ///
    /// Later documents override earlier ones field by field; blank values
    /// never override. A truthy `alwaysApply` anywhere in the stack forces
    /// `globs` to `**`.
    pub fn merge<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut merged = RulesMetadata::default();
        let mut always_apply = false;

        for document in documents {
            for (key, value) in document.metadata.iter() {
                match key.to_ascii_lowercase().as_str() {
                    "description" => {
                        if !value.trim().is_empty() {
                            merged.description = value.to_string();
                        }
                    }
                    // `applyTo` feeds the same field so Copilot and Cursor
                    // rules share applicability.
                    "globs" | "applyto" => {
                        if !value.trim().is_empty() {
                            merged.globs = value.to_string();
                        }
                    }
                    "alwaysapply" => {
                        if is_truthy(value) {
                            always_apply = true;
                        }
                    }
                    _ => {
                        merged.extra.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }

        if always_apply {
            merged.globs = ALWAYS_GLOBS.to_string();
        }
        merged
    }
}

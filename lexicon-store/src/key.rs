//! Key Normalization
//!
//! Every translation key is stored in one canonical flat form: its path
//! segments joined by [`SEPARATOR`], a control character that never shows up
//! in ordinary text. Callers address keys with a separator of their own
//! choosing (`.` by default), a list of segments, or both via a scope.
//!
//! ```
//! use lexicon_store::{Key, KeyNormalizer};
//!
//! let normalizer = KeyNormalizer::default();
//! assert_eq!(normalizer.flatten(&Key::from("foo.bar"), None, None), "foo\u{1}bar");
//! assert_eq!(
//!     normalizer.flatten(&Key::from("foo|bar"), None, Some("|")),
//!     normalizer.flatten(&Key::from(["foo", "bar"]), None, None),
//! );
//! ```

use serde::{Deserialize, Serialize};

/// Join character of canonical keys.
pub const SEPARATOR: char = '\u{1}';

/// Replacement for a literal [`SEPARATOR`] found inside a caller segment.
pub const SEPARATOR_ESCAPE: char = '\u{2}';

/// Caller-facing separator used when none is configured.
pub const DEFAULT_SEPARATOR: &str = ".";

/// A translation key as given by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// A single token, possibly separator-joined (`"foo.bar"`)
    Token(String),
    /// Ordered path segments; each may itself be separator-joined
    Segments(Vec<String>),
}

impl Key {
    /// Build a key from a canonical key, e.g. one read back from a record.
    ///
    /// Canonical keys must be flattened with [`SEPARATOR`] as the caller
    /// separator; this constructor does that splitting up front.
    pub fn canonical(key: &str) -> Self {
        Key::Segments(key.split(SEPARATOR).map(str::to_string).collect())
    }

    fn components(&self) -> &[String] {
        match self {
            Key::Token(token) => std::slice::from_ref(token),
            Key::Segments(segments) => segments,
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Token(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Token(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::Token(s.clone())
    }
}

impl From<Vec<String>> for Key {
    fn from(segments: Vec<String>) -> Self {
        Key::Segments(segments)
    }
}

impl From<Vec<&str>> for Key {
    fn from(segments: Vec<&str>) -> Self {
        Key::Segments(segments.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Key {
    fn from(segments: [&str; N]) -> Self {
        Key::Segments(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Token(token) => f.write_str(token),
            Key::Segments(segments) => f.write_str(&segments.join(DEFAULT_SEPARATOR)),
        }
    }
}

/// Turns caller keys into canonical keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNormalizer {
    default_separator: String,
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl KeyNormalizer {
    /// Create a normalizer with the given default caller separator.
    pub fn new(default_separator: impl Into<String>) -> Self {
        Self {
            default_separator: default_separator.into(),
        }
    }

    /// Separator used when a request does not specify one.
    pub fn default_separator(&self) -> &str {
        &self.default_separator
    }

    /// Flatten `scope` + `key` into a canonical key.
    ///
    /// Segment boundaries come only from `separator` (or the default one).
    /// Empty segments are dropped. Never fails: odd input yields a
    /// best-effort key.
    pub fn flatten(&self, key: &Key, scope: Option<&Key>, separator: Option<&str>) -> String {
        let separator = separator.unwrap_or(&self.default_separator);
        let scope_components = scope.map(Key::components).unwrap_or_default();

        let segments = scope_components
            .iter()
            .chain(key.components())
            .flat_map(|component| split_component(component, separator));

        join_segments(segments)
    }

    /// The caller separator to use for a request.
    pub fn separator_for<'a>(&'a self, separator: Option<&'a str>) -> &'a str {
        separator.unwrap_or(&self.default_separator)
    }
}

fn split_component<'a>(component: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        vec![component]
    } else {
        component.split(separator).collect()
    }
}

/// Join literal segments into a canonical key, escaping any embedded
/// [`SEPARATOR`] and dropping empty segments.
pub fn join_segments<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut canonical = String::new();
    for segment in segments.into_iter().filter(|s| !s.is_empty()) {
        if !canonical.is_empty() {
            canonical.push(SEPARATOR);
        }
        canonical.extend(segment.chars().map(|c| {
            if c == SEPARATOR {
                SEPARATOR_ESCAPE
            } else {
                c
            }
        }));
    }
    canonical
}

/// Append one form or child segment to a canonical key.
pub fn child_key(parent: &str, segment: &str) -> String {
    let child = join_segments([segment]);
    if parent.is_empty() {
        child
    } else if child.is_empty() {
        parent.to_string()
    } else {
        format!("{}{}{}", parent, SEPARATOR, child)
    }
}

/// Every ancestor of a canonical key, outermost first, ending with the key
/// itself: `a␁b␁c` gives `a`, `a␁b`, `a␁b␁c`.
pub fn expand(canonical: &str) -> Vec<String> {
    canonical
        .match_indices(SEPARATOR)
        .map(|(index, _)| canonical[..index].to_string())
        .chain((!canonical.is_empty()).then(|| canonical.to_string()))
        .collect()
}

/// Whether `key` is `prefix` itself or lies below it.
pub fn is_within(key: &str, prefix: &str) -> bool {
    key == prefix || is_descendant(key, prefix)
}

/// Whether `key` lies strictly below `prefix`.
pub fn is_descendant(key: &str, prefix: &str) -> bool {
    key.len() > prefix.len()
        && key.starts_with(prefix)
        && key[prefix.len()..].starts_with(SEPARATOR)
}

/// Render a canonical key with a human separator, for messages and logs.
pub fn display_key(canonical: &str, separator: &str) -> String {
    canonical
        .split(SEPARATOR)
        .collect::<Vec<_>>()
        .join(separator)
}

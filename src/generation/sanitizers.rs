//! Identifier sanitization for generated TypeScript
//!
//! Parameter names come from example payloads, URL templates and schemas, so
//! they can contain dashes, spaces, leading digits or keywords. The functions
//! here map them onto valid, collision-free identifiers.

use std::collections::HashSet;

/// Prefix for identifiers that would otherwise start with a digit
const DIGIT_PREFIX: &str = "var";

/// Identifier used when nothing usable is left after stripping
const FALLBACK_IDENTIFIER: &str = "variable";

/// Keywords that can't be used as binding names
const RESERVED_WORDS: &[&str] = &[
    "interface",
    "class",
    "let",
    "var",
    "const",
    "import",
    "export",
    "type",
    "switch",
    "case",
    "break",
    "if",
    "else",
    "return",
    "new",
    "this",
    "void",
    "delete",
    "catch",
    "try",
    "throw",
    "typeof",
    "instanceof",
    "in",
    "of",
    "for",
    "while",
    "do",
    "continue",
];

/// Whether `name` is in the reserved word list.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Whether `key` matches `[A-Za-z_$][A-Za-z0-9_$]*`.
pub fn is_bare_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Sanitizes an arbitrary key into a valid identifier.
///
/// Keys that are already valid, non-reserved identifiers are returned as-is.
/// Reserved words are escaped even when they are otherwise bare identifiers.
/// Otherwise separator runs (`-`, `_`, whitespace) become camel-case
/// boundaries, remaining disallowed characters are dropped, a leading digit
/// gets a `var` prefix and reserved words get a `_` prefix.
///
/// # Examples
/// ```
/// use hookgen::generation::sanitizers::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("userId"), "userId");
/// assert_eq!(sanitize_identifier("post-id"), "postId");
/// assert_eq!(sanitize_identifier("2fa code"), "var2faCode");
/// assert_eq!(sanitize_identifier("class"), "_class");
/// assert_eq!(sanitize_identifier("%%"), "variable");
/// ```
pub fn sanitize_identifier(key: &str) -> String {
    if is_bare_identifier(key) && !is_reserved_word(key) {
        return key.to_string();
    }

    let mut safe = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(ch) = chars.next() {
        if is_separator(ch) {
            while chars.peek().is_some_and(|c| is_separator(*c)) {
                chars.next();
            }
            if let Some(next) = chars.next() {
                safe.extend(next.to_uppercase());
            }
        } else {
            safe.push(ch);
        }
    }
    safe.retain(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if safe.starts_with(|c: char| c.is_ascii_digit()) {
        safe.insert_str(0, DIGIT_PREFIX);
    }
    if is_reserved_word(&safe) {
        safe.insert(0, '_');
    }
    if safe.is_empty() {
        return FALLBACK_IDENTIFIER.to_string();
    }
    safe
}

fn is_separator(ch: char) -> bool {
    ch == '-' || ch == '_' || ch.is_whitespace()
}

/// One original key and the identifier it is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    pub original: String,
    pub identifier: String,
}

impl VariableBinding {
    /// True when the key can be used as a shorthand binding.
    pub fn is_shorthand(&self) -> bool {
        self.original == self.identifier
    }
}

/// Ordered key to identifier mapping with unique identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableMapping {
    bindings: Vec<VariableBinding>,
}

impl VariableMapping {
    pub fn iter(&self) -> impl Iterator<Item = &VariableBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Identifier bound to `original`, if any.
    pub fn identifier_for(&self, original: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.original == original)
            .map(|b| b.identifier.as_str())
    }

    /// Bindings for `keys`, in the order of `keys`.
    pub fn subset<'a>(&'a self, keys: &'a [String]) -> impl Iterator<Item = &'a VariableBinding> {
        keys.iter()
            .filter_map(move |key| self.bindings.iter().find(|b| &b.original == key))
    }
}

/// Sanitizes every key and resolves collisions in key order.
///
/// A key whose identifier is already taken gets `_2`, `_3`, ... appended
/// until it is free.
pub fn resolve_all<S: AsRef<str>>(keys: &[S]) -> VariableMapping {
    resolve_all_excluding(keys, &[] as &[&str])
}

/// Like [`resolve_all`], with `taken` treated as already bound.
pub fn resolve_all_excluding<S: AsRef<str>, T: AsRef<str>>(
    keys: &[S],
    taken: &[T],
) -> VariableMapping {
    let mut seen: HashSet<String> = taken.iter().map(|t| t.as_ref().to_string()).collect();
    let mut bindings = Vec::with_capacity(keys.len());

    for key in keys {
        let key = key.as_ref();
        let base = sanitize_identifier(key);
        let mut candidate = base.clone();
        let mut counter = 2;
        while seen.contains(&candidate) {
            candidate = format!("{base}_{counter}");
            counter += 1;
        }
        seen.insert(candidate.clone());
        bindings.push(VariableBinding {
            original: key.to_string(),
            identifier: candidate,
        });
    }

    VariableMapping { bindings }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers_are_unchanged() {
        for key in ["id", "userId", "_private", "$ref", "snake_case", "a1"] {
            assert_eq!(sanitize_identifier(key), key);
        }
    }

    #[test]
    fn test_separators_become_camel_case() {
        assert_eq!(sanitize_identifier("post-id"), "postId");
        assert_eq!(sanitize_identifier("first name"), "firstName");
        assert_eq!(sanitize_identifier("a--b__c  d"), "aBCD");
        assert_eq!(sanitize_identifier("trailing-"), "trailing");
    }

    #[test]
    fn test_disallowed_characters_are_stripped() {
        assert_eq!(sanitize_identifier("price(usd)"), "priceusd");
        assert_eq!(sanitize_identifier("a.b"), "ab");
    }

    #[test]
    fn test_leading_digit_gets_prefix() {
        assert_eq!(sanitize_identifier("1st"), "var1st");
        assert_eq!(sanitize_identifier("42"), "var42");
    }

    #[test]
    fn test_reserved_words_get_underscore() {
        assert_eq!(sanitize_identifier("class"), "_class");
        assert_eq!(sanitize_identifier("de-lete"), "deLete");
        assert_eq!(sanitize_identifier("type "), "_type");
    }

    #[test]
    fn test_empty_result_falls_back() {
        assert_eq!(sanitize_identifier(""), "variable");
        assert_eq!(sanitize_identifier("---"), "variable");
        assert_eq!(sanitize_identifier("äö"), "variable");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "id", "post-id", "1st", "class", "", "a b c", "x--", "$$", "__", "in", "_in",
            "9 lives", "émile", "var",
        ];
        for input in inputs {
            let once = sanitize_identifier(input);
            assert_eq!(sanitize_identifier(&once), once, "input: {input:?}");
            assert!(is_bare_identifier(&once), "not an identifier: {once:?}");
        }
    }

    #[test]
    fn test_resolve_all_appends_counters() {
        let mapping = resolve_all(&["post-id", "postId", "post id", "other"]);
        let identifiers: Vec<&str> = mapping.iter().map(|b| b.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["postId", "postId_2", "postId_3", "other"]);
        assert_eq!(mapping.identifier_for("post id"), Some("postId_3"));
    }

    #[test]
    fn test_resolve_all_skips_taken_suffixes() {
        let mapping = resolve_all(&["a_2", "a", "a-", "a "]);
        let identifiers: Vec<&str> = mapping.iter().map(|b| b.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["a_2", "a", "a_3", "a_4"]);
    }

    #[test]
    fn test_resolve_all_is_deterministic() {
        let keys = ["x-y", "xY", "x y", "z"];
        assert_eq!(resolve_all(&keys), resolve_all(&keys));
    }

    #[test]
    fn test_resolve_all_excluding_avoids_taken_names() {
        let mapping = resolve_all_excluding(
            &["options", "signal", "id", "options_2"],
            &["options", "signal"],
        );
        let identifiers: Vec<&str> = mapping.iter().map(|b| b.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["options_2", "signal_2", "id", "options_3"]);
        assert!(!mapping.iter().next().unwrap().is_shorthand());
    }

    #[test]
    fn test_subset_follows_requested_order() {
        let mapping = resolve_all(&["id", "page-no", "q"]);
        let keys = vec!["q".to_string(), "page-no".to_string()];
        let picked: Vec<&str> = mapping.subset(&keys).map(|b| b.identifier.as_str()).collect();
        assert_eq!(picked, vec!["q", "pageNo"]);
    }
}

//! Placeholder substitution
//!
//! Tokens look like `%name%`. They come from two places: replacements handed
//! to the loader, and top-level config keys that themselves start with `%`.
//! The second kind lets a file define `%path%: /var/www` once and use
//! `%path%/web/images` in sibling entries.

use crate::domain::{stringify, ConfigTree};
use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};
use std::collections::HashMap;

/// Any `%...%` run, shortest match first.
static TOKEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new("%.+?%").expect("valid regex"));

const MATCHER_SIZE_LIMIT: usize = 64 * (1 << 20);

/// Finds known tokens, leftmost first and longest at a position.
#[derive(Debug, Clone)]
enum Matcher {
    Pattern(Regex),
    /// Tokens sorted longest first, tried in turn at every position.
    Literal(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderResolver {
    replacements: HashMap<String, String>,
    /// `None` when there are no tokens.
    matcher: Option<Matcher>,
}

impl PlaceholderResolver {
    /// Build from bare names; `("data", "x")` registers the token `%data%`.
    pub fn new<I, K, V>(replacements: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut resolver = Self::default();
        resolver.extend(replacements);
        resolver
    }

    pub fn extend<I, K, V>(&mut self, replacements: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in replacements {
            self.replacements.insert(format!("%{}%", name.as_ref()), value.into());
        }
        self.rebuild();
    }

    /// Register a full token such as `%path%`.
    pub fn set_token(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            return;
        }
        self.replacements.insert(token, value.into());
        self.rebuild();
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.replacements.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Pick up tokens defined by the config itself.
    ///
    /// Walks the top-level keys in file order. Each `%...%` key's value is
    /// stringified, every `%...%` run in it that names an already known token
    /// is replaced, and the result becomes that key's replacement. A key can
    /// therefore use tokens defined above it but not below it.
    pub fn harvest(&mut self, tree: &ConfigTree) {
        let Some(map) = tree.as_object() else {
            return;
        };

        let mut harvested = 0;
        for (key, value) in map.iter().filter(|(key, _)| key.starts_with('%')) {
            let text = stringify(value);
            let resolved = TOKEN_RUN
                .replace_all(&text, |caps: &Captures| {
                    let run = &caps[0];
                    self.replacements.get(run).cloned().unwrap_or_else(|| run.to_string())
                })
                .into_owned();
            tracing::trace!("Placeholder {} => {}", key, resolved);
            self.replacements.insert(key.clone(), resolved);
            harvested += 1;
        }

        if harvested > 0 {
            self.rebuild();
        }
    }

    /// Substitute every known token in every string of `value`.
    pub fn resolve(&self, value: ConfigTree) -> ConfigTree {
        let Some(matcher) = &self.matcher else {
            return value;
        };
        self.resolve_with(matcher, value)
    }

    pub fn replace_str(&self, text: &str) -> String {
        match &self.matcher {
            Some(matcher) => self.substitute(matcher, text),
            None => text.to_string(),
        }
    }

    fn resolve_with(&self, matcher: &Matcher, value: ConfigTree) -> ConfigTree {
        match value {
            ConfigTree::String(s) => ConfigTree::String(self.substitute(matcher, &s)),
            ConfigTree::Array(items) => {
                ConfigTree::Array(items.into_iter().map(|v| self.resolve_with(matcher, v)).collect())
            }
            ConfigTree::Object(map) => ConfigTree::Object(
                map.into_iter().map(|(k, v)| (k, self.resolve_with(matcher, v))).collect(),
            ),
            other => other,
        }
    }

    /// One left-to-right scan; replacement text is never rescanned.
    fn substitute(&self, matcher: &Matcher, text: &str) -> String {
        match matcher {
            Matcher::Pattern(regex) => regex
                .replace_all(text, |caps: &Captures| {
                    let token = &caps[0];
                    self.get(token).unwrap_or(token).to_string()
                })
                .into_owned(),
            Matcher::Literal(tokens) => {
                let mut out = String::with_capacity(text.len());
                let mut rest = text;
                while let Some(ch) = rest.chars().next() {
                    match tokens.iter().find(|t| rest.starts_with(t.as_str())) {
                        Some(token) => {
                            out.push_str(self.get(token).unwrap_or(token.as_str()));
                            rest = &rest[token.len()..];
                        }
                        None => {
                            out.push(ch);
                            rest = &rest[ch.len_utf8()..];
                        }
                    }
                }
                out
            }
        }
    }

    fn sorted_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.replacements.keys().cloned().collect();
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        tokens
    }

    fn rebuild(&mut self) {
        if self.replacements.is_empty() {
            self.matcher = None;
            return;
        }

        let tokens = self.sorted_tokens();
        let pattern = tokens.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");

        // Escaped literals always compile; only the size limit can reject them.
        let matcher = match RegexBuilder::new(&pattern).size_limit(MATCHER_SIZE_LIMIT).build() {
            Ok(regex) => Matcher::Pattern(regex),
            Err(e) => {
                tracing::debug!("Falling back to literal placeholder matching: {}", e);
                Matcher::Literal(tokens)
            }
        };
        self.matcher = Some(matcher);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constructor_names_are_wrapped() {
        let resolver = PlaceholderResolver::new([("data", "x")]);
        assert_eq!(resolver.get("%data%"), Some("x"));
        assert_eq!(resolver.get("data"), None);
    }

    #[test]
    fn resolves_nested_strings() {
        let resolver = PlaceholderResolver::new([("root", "/var/www"), ("env", "prod")]);
        let resolved = resolver.resolve(json!({
            "paths": ["%root%/web", "%root%/upload"],
            "name": "app-%env%",
            "port": 8080,
            "debug": false,
        }));
        assert_eq!(
            resolved,
            json!({
                "paths": ["/var/www/web", "/var/www/upload"],
                "name": "app-prod",
                "port": 8080,
                "debug": false,
            })
        );
    }

    #[test]
    fn unknown_tokens_stay_verbatim() {
        let resolver = PlaceholderResolver::new([("known", "yes")]);
        assert_eq!(resolver.replace_str("%known% %unknown%"), "yes %unknown%");
    }

    #[test]
    fn empty_resolver_returns_input() {
        let resolver = PlaceholderResolver::default();
        assert!(resolver.is_empty());
        assert_eq!(resolver.resolve(json!({"data": "%data%"})), json!({"data": "%data%"}));
    }

    #[test]
    fn replacement_text_is_not_rescanned() {
        let resolver = PlaceholderResolver::new([("a", "%b%"), ("b", "nope")]);
        assert_eq!(resolver.replace_str("%a%"), "%b%");
    }

    #[test]
    fn longest_token_wins_at_a_position() {
        let mut resolver = PlaceholderResolver::default();
        resolver.set_token("%a", "short");
        resolver.set_token("%a%", "long");
        assert_eq!(resolver.replace_str("%a%"), "long");
    }

    #[test]
    fn literal_matching_agrees_with_pattern_matching() {
        let mut resolver = PlaceholderResolver::new([("a", "%b%"), ("b", "B"), ("héllo", "hi")]);
        resolver.set_token("%a", "short");
        let literal = Matcher::Literal(resolver.sorted_tokens());

        for text in ["%a%", "%a%b% and %a", "ü %héllo% %b%%b%", "%unknown%", ""] {
            assert_eq!(resolver.substitute(&literal, text), resolver.replace_str(text), "{text}");
        }
        assert_eq!(resolver.substitute(&literal, "%a%%b%"), "%b%B");
    }

    #[test]
    fn harvest_reads_top_level_token_keys() {
        let mut resolver = PlaceholderResolver::default();
        resolver.harvest(&json!({
            "%path%": "/var/www",
            "path.images": "%path%/web/images",
            "nested": {"%ignored%": "x"},
        }));
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.get("%path%"), Some("/var/www"));
        assert_eq!(resolver.replace_str("%path%/web/images"), "/var/www/web/images");
    }

    #[test]
    fn harvest_only_sees_earlier_tokens() {
        let mut resolver = PlaceholderResolver::default();
        resolver.harvest(&json!({
            "%url%": "http://%host%",
            "%host%": "example.com",
            "%api%": "http://%host%/api",
        }));
        assert_eq!(resolver.get("%url%"), Some("http://%host%"));
        assert_eq!(resolver.get("%api%"), Some("http://example.com/api"));
    }

    #[test]
    fn harvest_uses_constructor_tokens_and_multiple_runs() {
        let mut resolver = PlaceholderResolver::new([("scheme", "https")]);
        resolver.harvest(&json!({
            "%host%": "example.com",
            "%url%": "%scheme%://%host%",
        }));
        assert_eq!(resolver.get("%url%"), Some("https://example.com"));
    }

    #[test]
    fn harvest_stringifies_scalar_values() {
        let mut resolver = PlaceholderResolver::default();
        resolver.harvest(&json!({"%port%": 8080, "%on%": true, "%off%": null}));
        assert_eq!(resolver.get("%port%"), Some("8080"));
        assert_eq!(resolver.get("%on%"), Some("1"));
        assert_eq!(resolver.get("%off%"), Some(""));
    }

    #[test]
    fn harvested_value_may_override_constructor_value() {
        let mut resolver = PlaceholderResolver::new([("path", "/tmp")]);
        resolver.harvest(&json!({"%path%": "/srv"}));
        assert_eq!(resolver.get("%path%"), Some("/srv"));
    }
}

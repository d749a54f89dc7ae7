use std::collections::HashMap;

use crate::resolve::TokenSet;

/// `[--` in a template is a literal `[-`, never the start of a token.
const ESCAPE: &str = "[--";
const ESCAPED: &str = "[-";

/// A token delimiter pair.
#[derive(Debug, Clone, Copy)]
struct Delimiters {
    open: &'static str,
    close: &'static str,
}

const CONTENT: Delimiters = Delimiters {
    open: "[-",
    close: "-]",
};

const PATH: Delimiters = Delimiters {
    open: "__",
    close: "__",
};

impl Delimiters {
    fn wrap(&self, key: &str) -> String {
        format!("{}{key}{}", self.open, self.close)
    }
}

/// Applies one [`TokenSet`] to paths (`__key__`) and contents (`[-key-]`).
#[derive(Debug, Clone)]
pub struct ContentProcessor {
    content_tokens: HashMap<String, String>,
    path_tokens: HashMap<String, String>,
}

impl ContentProcessor {
    pub fn new(tokens: &TokenSet) -> Self {
        let rekey = |delims: Delimiters| {
            tokens
                .iter()
                .map(|(k, v)| (delims.wrap(k), v.to_string()))
                .collect()
        };
        Self {
            content_tokens: rekey(CONTENT),
            path_tokens: rekey(PATH),
        }
    }

    /// Replace every `[-key-]` whose key is in the token set.
    pub fn process_text(&self, text: &str) -> String {
        substitute(text, CONTENT, &self.content_tokens)
    }

    /// Replace every `__key__` whose key is in the token set.
    pub fn process_path(&self, path: &str) -> String {
        substitute(path, PATH, &self.path_tokens)
    }
}

/// Single left-to-right pass. Replaced values are never rescanned, so the
/// result does not depend on the order tokens were defined in.
fn substitute(input: &str, delims: Delimiters, tokens: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix(ESCAPE) {
            out.push_str(ESCAPED);
            rest = after;
            continue;
        }

        if let Some(token_len) = match_token(rest, delims, tokens) {
            out.push_str(&tokens[&rest[..token_len]]);
            rest = &rest[token_len..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

/// Length of the known token at the start of `text`, if any.
fn match_token(text: &str, delims: Delimiters, tokens: &HashMap<String, String>) -> Option<usize> {
    let body = text.strip_prefix(delims.open)?;
    let end = body.find(delims.close)?;
    let len = delims.open.len() + end + delims.close.len();
    tokens.contains_key(&text[..len]).then_some(len)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn processor(pairs: &[(&str, &str)]) -> ContentProcessor {
        ContentProcessor::new(&pairs.iter().copied().collect())
    }

    #[rstest]
    #[case("Hello [-name-]!", "Hello Foo!")]
    #[case("[-name-][-company-]", "FooAcme")]
    #[case("[-unknown-] stays", "[-unknown-] stays")]
    #[case("[-name", "[-name")]
    #[case("__name__ is a path token", "__name__ is a path token")]
    #[case("[--name-] is literal", "[-name-] is literal")]
    #[case("a [--[-name-]", "a [-Foo")]
    #[case("ünïcödé [-name-] ✓", "ünïcödé Foo ✓")]
    fn processes_text(#[case] input: &str, #[case] expected: &str) {
        let p = processor(&[("name", "Foo"), ("company", "Acme")]);
        assert_eq!(p.process_text(input), expected);
    }

    #[rstest]
    #[case("src/__name__/__name__.cpp", "src/Foo/Foo.cpp")]
    #[case("src/___name__", "src/_Foo")]
    #[case("__init__.py", "__init__.py")]
    #[case("[-name-]/x", "[-name-]/x")]
    #[case("docs/[--name-].md", "docs/[-name-].md")]
    fn processes_paths(#[case] input: &str, #[case] expected: &str) {
        let p = processor(&[("name", "Foo")]);
        assert_eq!(p.process_path(input), expected);
    }

    #[test]
    fn values_are_not_rescanned() {
        let p = processor(&[("a", "[-b-]"), ("b", "B")]);
        assert_eq!(p.process_text("[-a-]"), "[-b-]");
    }

    #[test]
    fn similar_keys_do_not_interfere() {
        let p = processor(&[
            ("processor_uuid", "P"),
            ("debug_processor_uuid", "DP"),
        ]);
        assert_eq!(
            p.process_text("[-processor_uuid-] [-debug_processor_uuid-]"),
            "P DP"
        );
    }

    fn token_key() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["name", "company", "target", "year"]).prop_map(String::from)
    }

    fn template_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                "[a-zA-Z0-9 .,;(){}\n]{0,12}",
                token_key().prop_map(|k| format!("[-{k}-]")),
            ],
            0..12,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn text_substitution_is_idempotent(
            text in template_text(),
            values in prop::collection::vec("[A-Z0-9 ]{0,8}", 4),
        ) {
            let keys = ["name", "company", "target", "year"];
            let tokens: TokenSet = keys.iter().copied().zip(values.iter().cloned()).collect();
            let p = ContentProcessor::new(&tokens);

            let once = p.process_text(&text);
            let twice = p.process_text(&once);
            prop_assert_eq!(once, twice);
        }
    }
}

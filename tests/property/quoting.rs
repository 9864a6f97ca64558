//! Property-based tests for key and string quoting

use nix_scribe::nix::{quote_key, quote_string};
use proptest::prelude::*;

const KEYWORDS: &[&str] = &[
    "assert", "else", "if", "in", "inherit", "let", "or", "rec", "then", "with",
];

/// Quoting an already quoted key changes nothing
#[test]
fn test_quote_key_idempotent_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&"[a-z0-9 ._\"$'{}@\\\\-]{0,16}", |key| {
            let once = quote_key(&key);
            let twice = quote_key(&once);
            prop_assert_eq!(&twice, &once, "key {:?}", key);
            Ok(())
        })
        .unwrap();
}

/// Dotted identifier paths are written bare unless a segment is a keyword
#[test]
fn test_identifier_paths_stay_bare_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &proptest::collection::vec("[a-z_][a-zA-Z0-9_-]{0,6}", 1..5),
            |segments| {
                let key = segments.join(".");
                let quoted = quote_key(&key);
                if segments.iter().any(|s| KEYWORDS.contains(&s.as_str())) {
                    prop_assert!(quoted.contains('"'));
                } else {
                    prop_assert_eq!(quoted, key);
                }
                Ok(())
            },
        )
        .unwrap();
}

/// A single-line string never opens an interpolation or spans lines
#[test]
fn test_quote_string_is_inert_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<String>(), |text| {
            let quoted = quote_string(&text);
            prop_assert!(!quoted.contains('\n'));

            let inner = &quoted[1..quoted.len() - 1];
            let mut chars = inner.chars().peekable();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        chars.next();
                    }
                    '"' => prop_assert!(false, "unescaped quote in {:?}", quoted),
                    '$' => prop_assert_ne!(chars.peek(), Some(&'{'), "open interpolation in {:?}", quoted),
                    _ => {}
                }
            }
            Ok(())
        })
        .unwrap();
}

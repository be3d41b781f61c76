#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Distinct class names, 1..=max_len of them.
pub fn arb_class_names(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,8}", 1..=max_len)
        .prop_map(|names| names.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

/// A class list and a shuffled copy of it.
pub fn arb_permuted_lists(max_len: usize) -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    arb_class_names(max_len).prop_flat_map(|old| {
        let new = Just(old.clone()).prop_shuffle();
        (Just(old), new)
    })
}

fn arb_coord() -> impl Strategy<Value = String> {
    (0.0f64..1.0).prop_map(|v| format!("{:.6}", v))
}

/// A single-spaced YOLO detection line with a class index in `0..max_class`.
pub fn arb_detection_line(max_class: usize) -> impl Strategy<Value = String> {
    (
        0..max_class,
        prop::collection::vec(arb_coord(), 4..=6),
    )
        .prop_map(|(class, coords)| format!("{} {}", class, coords.join(" ")))
}

/// A line the remapper must never touch.
pub fn arb_passthrough_line() -> impl Strategy<Value = String> {
    prop_oneof![
        // Too few tokens.
        (0usize..10, prop::collection::vec(arb_coord(), 0..=3))
            .prop_map(|(class, coords)| {
                let mut tokens = vec![class.to_string()];
                tokens.extend(coords);
                tokens.join(" ")
            }),
        // Non-integer class token.
        ("[a-z]{1,4}|[0-9]\\.[0-9]", prop::collection::vec(arb_coord(), 4))
            .prop_map(|(head, coords)| format!("{} {}", head, coords.join(" "))),
        // Negative class index.
        (1usize..10, prop::collection::vec(arb_coord(), 4))
            .prop_map(|(class, coords)| format!("-{} {}", class, coords.join(" "))),
    ]
}

/// Label file content: detection lines, pass-through lines, no blanks.
pub fn arb_label_text(max_class: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            3 => arb_detection_line(max_class),
            1 => arb_passthrough_line(),
        ],
        0..20,
    )
}

pub fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    if !lines.is_empty() {
        text.push('\n');
    }
    text
}

//! Generated-document properties of horizontal navigation and position
//! normalization.

use markdown_caret_engine::{
    Document, MemorySink, MonospaceLayout, Navigator, NodeKind, Place, Position, Selection, normalize,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use unicode_segmentation::UnicodeSegmentation;

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn code_word() -> impl Strategy<Value = String> {
    "[a-z]{1,3}".prop_map(|w| format!("`{w}`"))
}

/// Paragraphs of plain words.
fn plain_markdown() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::collection::vec(word(), 1..6), 1..4).prop_map(|paragraphs| {
        paragraphs
            .iter()
            .map(|words| words.join(" "))
            .collect::<Vec<_>>()
            .join("\n\n")
    })
}

/// Words built from letters, accented letters and emoji sequences.
fn clustered_word() -> impl Strategy<Value = String> {
    let cluster = prop_oneof![
        4 => "[a-z]",
        1 => Just("e\u{301}".to_string()),
        1 => Just("n\u{303}\u{323}".to_string()),
        1 => Just("\u{1F469}\u{200D}\u{1F4BB}".to_string()),
        1 => Just("\u{1F1EF}\u{1F1F5}".to_string()),
    ];
    proptest::collection::vec(cluster, 1..6).prop_map(|parts| parts.concat())
}

fn clustered_markdown() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::collection::vec(clustered_word(), 1..5), 1..3).prop_map(|paragraphs| {
        paragraphs
            .iter()
            .map(|words| words.join(" "))
            .collect::<Vec<_>>()
            .join("\n\n")
    })
}

/// Paragraphs that start with a plain word and mix in inline code.
fn mixed_markdown() -> impl Strategy<Value = String> {
    let token = prop_oneof![3 => word(), 1 => code_word()];
    let paragraph = (word(), proptest::collection::vec(token, 0..6)).prop_map(|(first, rest)| {
        std::iter::once(first).chain(rest).collect::<Vec<_>>().join(" ")
    });
    proptest::collection::vec(paragraph, 1..4).prop_map(|ps| ps.join("\n\n"))
}

fn at_start(doc: &Document) -> MemorySink {
    let run = doc.first_text_run(doc.root()).expect("document has text");
    MemorySink::at(Selection::caret(run, 0))
}

/// Every place visited walking in one direction until the document edge.
fn walk(doc: &mut Document, sink: &mut MemorySink, forward: bool) -> Vec<Option<Place>> {
    let mut nav = Navigator::new(MonospaceLayout::default());
    let mut places = vec![nav.place(doc, sink)];
    for _ in 0..1000 {
        let moved = if forward {
            nav.move_cursor_forward(doc, sink, || ())
        } else {
            nav.move_cursor_backward(doc, sink, || ())
        };
        if !moved {
            break;
        }
        places.push(nav.place(doc, sink));
    }
    places
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn forward_advances_one_character_per_call(src in plain_markdown()) {
        let mut doc = Document::from_markdown(&src);
        let mut nav = Navigator::new(MonospaceLayout::default());
        let mut sink = at_start(&doc);
        let total = doc.plain_text().chars().count();

        prop_assert_eq!(nav.plain_offset(&doc, &sink), Some(0));
        for expected in 1..=total {
            prop_assert!(nav.move_cursor_forward(&mut doc, &mut sink, || ()));
            prop_assert_eq!(nav.plain_offset(&doc, &sink), Some(expected));
        }
        prop_assert!(!nav.move_cursor_forward(&mut doc, &mut sink, || ()));
        prop_assert_eq!(nav.plain_offset(&doc, &sink), Some(total));
    }

    #[test]
    fn forward_advances_one_grapheme_per_call(src in clustered_markdown()) {
        let mut doc = Document::from_markdown(&src);
        let mut nav = Navigator::new(MonospaceLayout::default());
        let mut sink = at_start(&doc);
        let total = doc.plain_text().graphemes(true).count();

        for expected in 1..=total {
            prop_assert!(nav.move_cursor_forward(&mut doc, &mut sink, || ()));
            prop_assert_eq!(nav.plain_offset(&doc, &sink), Some(expected));
        }
        prop_assert!(!nav.move_cursor_forward(&mut doc, &mut sink, || ()));
    }

    #[test]
    fn backward_retraces_forward(src in mixed_markdown()) {
        let mut doc = Document::from_markdown(&src);
        let mut sink = at_start(&doc);

        let forward = walk(&mut doc, &mut sink, true);
        let mut backward = walk(&mut doc, &mut sink, false);
        backward.reverse();

        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn normalization_is_idempotent(src in mixed_markdown()) {
        let doc = Document::from_markdown(&src);
        let runs: Vec<_> = doc
            .descendants(doc.root())
            .filter(|n| matches!(doc.kind(*n), NodeKind::TextRun { .. }))
            .collect();

        for run in runs {
            let len = doc.text(run).map_or(0, |t| t.chars().count());
            for offset in 0..=len {
                let Some(Place::Caret(first)) = normalize(&doc, &Position::TextOffset { run, offset }) else {
                    continue;
                };
                prop_assert_eq!(normalize(&doc, &first), Some(Place::Caret(first)));
            }
        }
    }
}

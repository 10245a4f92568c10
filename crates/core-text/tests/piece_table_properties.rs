//! Property-based tests for piece table round trips and bounds.

use core_text::{Buffer, TextError};
use proptest::prelude::*;

fn text_strategy() -> impl Strategy<Value = String> {
    // Mix ASCII, newlines and multi-byte runes so rune/byte confusion shows up.
    proptest::collection::vec(
        prop_oneof![
            Just('a'),
            Just('z'),
            Just(' '),
            Just('\n'),
            Just('é'),
            Just('漢'),
            Just('😀'),
        ],
        0..40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn text_round_trips(text in text_strategy()) {
        let buf = Buffer::from_str("p", &text);
        prop_assert_eq!(buf.text(), text.clone());
        prop_assert_eq!(buf.len(), text.chars().count());
    }

    #[test]
    fn insert_then_delete_restores(text in text_strategy(), ins in text_strategy(), at in 0usize..64) {
        let mut buf = Buffer::from_str("p", &text);
        let pos = at.min(buf.len());
        let n = ins.chars().count();
        buf.insert(pos, &ins).unwrap();
        buf.delete(pos, pos + n).unwrap();
        prop_assert_eq!(buf.text(), text);
    }

    #[test]
    fn slice_length_matches_range(text in text_strategy(), a in 0usize..64, b in 0usize..64) {
        let buf = Buffer::from_str("p", &text);
        let len = buf.len();
        let (lo, hi) = (a.min(b), a.max(b));
        if hi <= len {
            prop_assert_eq!(buf.slice(lo, hi).unwrap().chars().count(), hi - lo);
        } else {
            let is_oob = matches!(buf.slice(lo, hi), Err(TextError::OutOfBounds { .. }));
            prop_assert!(is_oob);
        }
    }

    #[test]
    fn inverse_operations_replay_to_original(
        text in text_strategy(),
        edits in proptest::collection::vec((any::<bool>(), 0usize..64, 0usize..8, text_strategy()), 1..12),
    ) {
        let mut buf = Buffer::from_str("p", &text);
        let mut inverses = Vec::new();
        for (is_insert, at, span, ins) in edits {
            let pos = at.min(buf.len());
            let inv = if is_insert {
                buf.insert(pos, &ins).unwrap()
            } else {
                let end = (pos + span).min(buf.len());
                buf.delete(pos, end).unwrap()
            };
            inverses.extend(inv);
        }
        for op in inverses.iter().rev() {
            buf.apply(op).unwrap();
        }
        prop_assert_eq!(buf.text(), text);
    }

    #[test]
    fn line_table_tracks_edits(
        text in text_strategy(),
        edits in proptest::collection::vec((any::<bool>(), 0usize..64, 0usize..8, text_strategy()), 1..12),
    ) {
        let mut buf = Buffer::from_str("p", &text);
        for (is_insert, at, span, ins) in edits {
            // Read first so the cached line table exists before the edit.
            prop_assert!(buf.line_count() >= 1);
            let pos = at.min(buf.len());
            if is_insert {
                buf.insert(pos, &ins).unwrap();
            } else {
                let end = (pos + span).min(buf.len());
                buf.delete(pos, end).unwrap();
            }
            let fresh = Buffer::from_str("f", &buf.text());
            prop_assert_eq!(buf.line_count(), fresh.line_count());
            for line in 0..fresh.line_count() {
                prop_assert_eq!(buf.line_start_offset(line).unwrap(), fresh.line_start_offset(line).unwrap());
                prop_assert_eq!(buf.line_end_offset(line).unwrap(), fresh.line_end_offset(line).unwrap());
            }
            for pos in 0..=buf.len() {
                prop_assert_eq!(buf.offset_to_line_col(pos).unwrap(), fresh.offset_to_line_col(pos).unwrap());
            }
        }
    }
}

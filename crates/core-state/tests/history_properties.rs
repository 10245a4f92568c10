//! Property-based tests for undo/redo symmetry over arbitrary edit sequences.

use core_state::EditorState;
use core_text::Buffer;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Insert(usize, String),
    Delete(usize, usize),
    GroupOpen,
    GroupClose,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..64, "[a-c😀\n ]{0,5}").prop_map(|(p, s)| Edit::Insert(p, s)),
        (0usize..64, 0usize..6).prop_map(|(p, n)| Edit::Delete(p, n)),
        Just(Edit::GroupOpen),
        Just(Edit::GroupClose),
    ]
}

fn run(state: &mut EditorState, edits: &[Edit]) {
    let mut open = 0usize;
    for e in edits {
        let len = state.buffer().len();
        match e {
            Edit::Insert(p, s) => state.insert((*p).min(len), s).unwrap(),
            Edit::Delete(p, n) => {
                let start = (*p).min(len);
                let end = (start + n).min(len);
                state.delete(start, end).unwrap();
            }
            Edit::GroupOpen => {
                state.begin_group(0);
                open += 1;
            }
            Edit::GroupClose if open > 0 => {
                state.end_group();
                open -= 1;
            }
            Edit::GroupClose => {}
        }
    }
    for _ in 0..open {
        state.end_group();
    }
}

proptest! {
    #[test]
    fn undo_all_restores_and_redo_all_replays(
        initial in "[a-z \n]{0,20}",
        edits in proptest::collection::vec(edit_strategy(), 0..30),
    ) {
        let mut state = EditorState::new(Buffer::from_str("p", &initial));
        run(&mut state, &edits);
        let final_text = state.buffer().text();
        while state.undo().is_ok() {}
        prop_assert_eq!(state.buffer().text(), initial);
        while state.redo().is_ok() {}
        prop_assert_eq!(state.buffer().text(), final_text);
    }

    #[test]
    fn closed_group_is_single_undo_step(
        initial in "[a-z]{1,10}",
        inserts in proptest::collection::vec("[x-z]{1,3}", 1..6),
    ) {
        let mut state = EditorState::new(Buffer::from_str("p", &initial));
        state.begin_group(0);
        for s in &inserts {
            let len = state.buffer().len();
            state.insert(len, s).unwrap();
        }
        state.end_group();
        prop_assert_eq!(state.undo_depth(), 1);
        state.undo().unwrap();
        prop_assert_eq!(state.buffer().text(), initial);
    }
}

#![forbid(unsafe_code)]

//! Property tests: panels mirror entries under arbitrary operation sequences.
//!
//! Run:
//!   cargo test -p roller-core --test proptest_roller_invariants

use proptest::prelude::*;
use roller_core::{CollectionController, Roller, RollerConfig};

#[derive(Debug, Clone)]
enum Op {
    Add(u16),
    SwipeNext,
    SwipePrevious,
    JumpCollection(usize),
    SetEditing(bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u16>().prop_map(Op::Add),
        2 => Just(Op::SwipeNext),
        2 => Just(Op::SwipePrevious),
        1 => (0_usize..40).prop_map(Op::JumpCollection),
        1 => any::<bool>().prop_map(Op::SetEditing),
    ]
}

proptest! {
    #[test]
    fn panels_track_entries(
        preloaded in prop::collection::vec(any::<u16>(), 0..8),
        wrap in any::<bool>(),
        ops in prop::collection::vec(op(), 0..48),
    ) {
        let controller = CollectionController::new();
        controller.load_silently(preloaded.iter().copied());
        let config = RollerConfig { wrap, ..RollerConfig::default() };
        let roller = Roller::new(controller.clone(), config).expect("roller");
        controller.mark_ready().expect("ready");

        prop_assert_eq!(roller.panels().len(), preloaded.len());
        prop_assert!(!controller.is_editing());

        for op in ops {
            match op {
                Op::Add(value) => {
                    let entry = controller.add(value).expect("add");
                    prop_assert_eq!(Some(roller.index()), controller.index_of(&entry));
                    prop_assert!(controller.is_editing());
                }
                Op::SwipeNext => {
                    roller.panel_stack().next();
                }
                Op::SwipePrevious => {
                    roller.panel_stack().previous();
                }
                Op::JumpCollection(index) => {
                    controller.set_index(index);
                }
                Op::SetEditing(editing) => {
                    controller.set_editing(editing);
                    prop_assert_eq!(roller.is_editing(), editing);
                }
            }

            prop_assert_eq!(roller.panels().len(), controller.len());
            prop_assert_eq!(roller.index(), controller.index());
            prop_assert!(roller.bindings_converged());
            prop_assert!(roller.verify().is_ok());
            prop_assert!(roller.panel_stack().is_layout_current());
            if !controller.is_empty() {
                prop_assert!(roller.index() < controller.len());
            }
        }

        let records: Vec<u16> = roller
            .panel_entries()
            .into_iter()
            .map(|entry| *entry.expect("bound").record())
            .collect();
        let expected: Vec<u16> = controller.models().iter().map(|e| *e.record()).collect();
        prop_assert_eq!(records, expected);
    }
}

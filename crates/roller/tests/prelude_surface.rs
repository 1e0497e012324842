#![forbid(unsafe_code)]

//! The facade exposes a complete roller through the prelude alone.

use roller::prelude::*;

#[test]
fn prelude_drives_a_full_session() {
    let notes = CollectionController::new();
    notes.load_silently(["A", "B"]);
    let roller = Roller::new(notes.clone(), RollerConfig::default()).expect("roller");
    notes.mark_ready().expect("ready");

    let presentation: Observable<Presentation> = roller.presentation_property();
    notes.add("C").expect("add");

    assert_eq!(roller.panels().len(), 3);
    assert_eq!(presentation.get(), Presentation::Editing);
    assert_eq!(notes.index(), 2);
    roller.verify().expect("in sync");
}

#[test]
fn facade_modules_reach_the_member_crates() {
    let stack: roller::core::PanelStack<()> =
        roller::core::PanelStack::new(Box::new(roller::TopBottomArranger), 10, false);
    assert_eq!(stack.arranger_name(), "top_bottom");

    let a = roller::reactive::Observable::new(1);
    let b = Observable::new(0);
    let _binding = TwoWayBinding::new(&a, &b);
    assert_eq!(b.get(), 1);
}

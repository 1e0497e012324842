#![forbid(unsafe_code)]

//! Panel roller public facade.
//!
//! Re-exports the collection, panel stack and synchroniser from
//! `roller-core` and the binding primitives from `roller-reactive`, plus a
//! prelude for everyday use.
//!
//! ```
//! use roller::prelude::*;
//!
//! let notes = CollectionController::new();
//! notes.load_silently(["groceries", "todo"]);
//!
//! let roller = Roller::new(notes.clone(), RollerConfig::default())?;
//! notes.mark_ready()?;
//! assert_eq!(roller.panels().len(), 2);
//!
//! notes.add("ideas")?;
//! assert_eq!(notes.index(), 2);
//! assert!(notes.is_editing());
//! # Ok::<(), roller::RollerError>(())
//! ```

// --- Core re-exports -------------------------------------------------------

pub use roller_core::{
    Arranger, ArrangerKind, CardArranger, CollectionController, ConfigError, Entry, EntryId,
    LeftRightArranger, MarkerConfig, Panel, PanelController, PanelId, PanelIndex, PanelSpec,
    PanelStack, Placement, Presentation, Result, Roller, RollerConfig, RollerError,
    TopBottomArranger, marker_delta, transition,
};

// --- Reactive re-exports ---------------------------------------------------

pub use roller_reactive::{Endpoint, Observable, Subscription, TwoWayBinding};

/// Everyday imports.
pub mod prelude {
    pub use crate::{
        CollectionController, Endpoint, Entry, Observable, Presentation, Result, Roller,
        RollerConfig, RollerError, Subscription, TwoWayBinding,
    };

    pub use crate::{core, reactive};
}

pub use roller_core as core;
pub use roller_reactive as reactive;

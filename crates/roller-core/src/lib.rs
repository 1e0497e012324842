#![forbid(unsafe_code)]

//! Panel roller core.
//!
//! A paginated container whose pages are generated one-to-one from the
//! entries of an ordered collection and kept in step with it.
//!
//! # Key Components
//!
//! - [`CollectionController`] - ordered entries, current index, editing flag,
//!   `ready` and `entry-added` notifications
//! - [`PanelStack`] - ordered panels with a clamped active index and a lazily
//!   computed layout
//! - [`Arranger`] - pluggable arrangement strategy for the stack
//! - [`Roller`] - the synchroniser tying the two together
//! - [`editing::transition`] - presentation state machine for edit mode
//! - [`RollerConfig`] - configuration loadable from TOML or JSON
//!
//! # Threading
//!
//! Single-threaded. Every notification is handled to completion,
//! synchronously, before the call that triggered it returns.

pub mod arranger;
pub mod collection;
pub mod config;
pub mod editing;
pub mod error;
pub mod panels;
pub mod roller;

pub use arranger::{Arranger, CardArranger, LeftRightArranger, Placement, TopBottomArranger};
pub use collection::{CollectionController, Entry, EntryId};
pub use config::{ArrangerKind, MarkerConfig, RollerConfig};
pub use editing::{Presentation, marker_delta, transition};
pub use error::{ConfigError, Result, RollerError};
pub use panels::{Panel, PanelController, PanelId, PanelIndex, PanelSpec, PanelStack};
pub use roller::Roller;

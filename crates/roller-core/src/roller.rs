#![forbid(unsafe_code)]

//! The roller: a panel stack generated from, and kept in step with, a
//! [`CollectionController`].
//!
//! # Protocol
//!
//! - **ready**: one panel per existing entry, in collection order. The
//!   editing flag is left alone; this batch is restored state, not a user
//!   action.
//! - **entry-added**: one panel for the new entry, the stack moves to it, and
//!   the editing flag goes up.
//! - **index**: the stack index and the collection index are two-way bound.
//!   While attached, the roller also constrains writes to the collection
//!   index with the stack's clamp (or wrap), so an out-of-range value is
//!   corrected before any collection observer sees it.
//! - **isEditing**: the roller's flag and the collection's flag are two-way
//!   bound; every change of the roller's flag runs the presentation state
//!   machine in [`editing`](crate::editing).
//!
//! Every panel creation is followed by a forced layout pass, since the stack
//! does not re-arrange on membership changes by itself.
//!
//! # Invariants
//!
//! 1. After the initial sync, panel `i` shows entry `i` for every `i`, and
//!    there are exactly as many panels as entries (see [`Roller::verify`]).
//! 2. A second `ready` never creates panels.
//! 3. An `entry-added` that arrives before the initial sync creates nothing;
//!    the entry is already in the collection and the sync will cover it.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use roller_reactive::{Observable, Subscription, TwoWayBinding};
use tracing::{debug, info, info_span, warn};
use web_time::Instant;

use crate::collection::{CollectionController, Entry};
use crate::config::RollerConfig;
use crate::editing::{Presentation, marker_delta, transition};
use crate::error::{Result, RollerError};
use crate::panels::{Panel, PanelSpec, PanelStack};

struct Inner<M> {
    controller: CollectionController<M>,
    stack: PanelStack<M>,
    editing: Observable<bool>,
    presentation: Observable<Presentation>,
    synced: Cell<bool>,
    config: RollerConfig,
}

impl<M: 'static> Inner<M> {
    fn sync_panels_to_collection(&self) -> Result<()> {
        if self.synced.replace(true) {
            debug!("initial sync already done; ignoring ready");
            return Ok(());
        }

        let entries = self.controller.models();
        let started = Instant::now();
        let _span = info_span!(
            "roller.sync",
            entries = entries.len() as u64,
            duration_us = tracing::field::Empty
        )
        .entered();

        for entry in &entries {
            self.create_panel_for(entry);
        }

        let duration_us = started.elapsed().as_micros() as u64;
        tracing::Span::current().record("duration_us", duration_us);
        info!(panels = self.stack.len(), "panels synced to collection");
        Ok(())
    }

    fn did_add_entry(&self, entry: &Entry<M>) -> Result<()> {
        if !self.synced.get() {
            warn!(
                entry_id = entry.id().get(),
                "entry added before initial sync; its panel is created on ready"
            );
            return Ok(());
        }

        let position = self
            .controller
            .index_of(entry)
            .ok_or(RollerError::UnknownEntry { id: entry.id() })?;
        self.create_panel_for(entry);
        self.stack.set_index(position);
        self.editing.set(true);
        Ok(())
    }

    fn create_panel_for(&self, entry: &Entry<M>) {
        let panel = self
            .stack
            .create_child(PanelSpec::new(self.config.panel_kind.clone()));
        panel.controller().set_model(entry.clone());
        self.stack.relayout();
        debug!(
            panel_id = panel.id().get(),
            entry_id = entry.id().get(),
            position = self.stack.len() - 1,
            "panel created for entry"
        );
    }

    fn editing_changed(&self, editing: bool) {
        let from = self.presentation.get();
        let to = transition(from, editing);
        if from != to {
            let (removed, added) = marker_delta(from, to, &self.config.markers);
            debug!(
                from = from.as_str(),
                to = to.as_str(),
                removed = removed.unwrap_or(""),
                added = added.unwrap_or(""),
                "presentation transition"
            );
            self.presentation.set(to);
        }
    }
}

/// Panel stack synchronised with a collection.
///
/// Dropping the roller detaches it from the collection: its listeners and
/// bindings go with it.
pub struct Roller<M> {
    inner: Rc<Inner<M>>,
    index_binding: TwoWayBinding<usize>,
    editing_binding: TwoWayBinding<bool>,
    _listeners: Vec<Subscription>,
}

impl<M: 'static> Roller<M> {
    /// Attach a new roller to `controller`.
    ///
    /// If the collection is already ready, the initial sync runs before
    /// this returns.
    pub fn new(controller: CollectionController<M>, config: RollerConfig) -> Result<Self> {
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(RollerError::InvalidConfig(problems));
        }

        let stack = PanelStack::from_config(&config);
        let inner = Rc::new(Inner {
            editing: Observable::new(controller.is_editing()),
            presentation: Observable::new(Presentation::Neutral),
            synced: Cell::new(false),
            controller,
            stack,
            config,
        });

        let mut listeners = Vec::with_capacity(4);
        listeners.push({
            let stack = inner.stack.clone();
            inner
                .controller
                .index_property()
                .constrain(move |index| stack.normalize(index))
        });
        listeners.push({
            let inner = Rc::clone(&inner);
            inner
                .editing
                .clone()
                .subscribe(move |&editing| inner.editing_changed(editing))
        });

        let editing_binding =
            TwoWayBinding::new(&inner.controller.editing_property(), &inner.editing);
        let index_binding = TwoWayBinding::new(
            &inner.stack.index_endpoint(),
            &inner.controller.index_property(),
        );

        listeners.push({
            let inner = Rc::clone(&inner);
            inner
                .controller
                .clone()
                .on_ready(move || inner.sync_panels_to_collection())
        });
        listeners.push({
            let inner = Rc::clone(&inner);
            inner
                .controller
                .clone()
                .on_entry_added(move |entry| inner.did_add_entry(entry))
        });

        let roller = Self {
            inner,
            index_binding,
            editing_binding,
            _listeners: listeners,
        };
        debug!(
            arranger = roller.inner.stack.arranger_name(),
            entries = roller.inner.controller.len(),
            "roller attached"
        );

        if roller.inner.controller.is_ready() {
            roller.inner.sync_panels_to_collection()?;
        }
        Ok(roller)
    }

    /// The collection this roller mirrors.
    #[must_use]
    pub fn controller(&self) -> &CollectionController<M> {
        &self.inner.controller
    }

    /// The stack holding one panel per entry.
    #[must_use]
    pub fn panel_stack(&self) -> &PanelStack<M> {
        &self.inner.stack
    }

    /// Snapshot of the panels in creation order.
    #[must_use]
    pub fn panels(&self) -> Vec<Panel<M>> {
        self.inner.stack.panels()
    }

    /// Entries shown by the panels, in panel order.
    #[must_use]
    pub fn panel_entries(&self) -> Vec<Option<Entry<M>>> {
        self.panels()
            .iter()
            .map(|panel| panel.controller().model())
            .collect()
    }

    /// Index of the panel in view.
    #[must_use]
    pub fn index(&self) -> usize {
        self.inner.stack.index()
    }

    /// Move the stack; the collection index follows.
    pub fn set_index(&self, index: usize) -> bool {
        self.inner.stack.set_index(index)
    }

    /// The roller's editing flag.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.inner.editing.get()
    }

    /// Write the roller's editing flag; the collection flag follows.
    pub fn set_editing(&self, editing: bool) -> bool {
        self.inner.editing.set(editing)
    }

    /// The roller side of the editing binding.
    #[must_use]
    pub fn editing_property(&self) -> Observable<bool> {
        self.inner.editing.clone()
    }

    /// Current presentation state.
    #[must_use]
    pub fn presentation(&self) -> Presentation {
        self.inner.presentation.get()
    }

    /// Presentation state, for whatever applies markers to the view.
    #[must_use]
    pub fn presentation_property(&self) -> Observable<Presentation> {
        self.inner.presentation.clone()
    }

    /// Markers the container carries right now: the container class, then
    /// the presentation marker if any.
    #[must_use]
    pub fn container_markers(&self) -> Vec<&str> {
        let config = &self.inner.config;
        let mut markers = vec![config.container_class.as_str()];
        markers.extend(self.presentation().marker(&config.markers));
        markers
    }

    /// True once panels have been created for the initial entries.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.inner.synced.get()
    }

    /// Validated configuration this roller was built with.
    #[must_use]
    pub fn config(&self) -> &RollerConfig {
        &self.inner.config
    }

    /// True when both bindings hold equal values on both sides.
    #[must_use]
    pub fn bindings_converged(&self) -> bool {
        self.index_binding.is_converged() && self.editing_binding.is_converged()
    }

    /// Check that panels and entries correspond one to one, in order.
    ///
    /// Always succeeds before the initial sync.
    pub fn verify(&self) -> Result<()> {
        if !self.is_synced() {
            return Ok(());
        }
        let entries = self.inner.controller.models();
        let panels = self.inner.stack.panels();

        for position in 0..entries.len().max(panels.len()) {
            match (entries.get(position), panels.get(position)) {
                (Some(entry), Some(panel)) => {
                    let shown = panel.controller().model();
                    if shown.as_ref() != Some(entry) {
                        return Err(RollerError::OutOfSync {
                            position,
                            detail: format!(
                                "{} shows {}, expected entry {}",
                                panel.id(),
                                shown.map_or_else(|| "nothing".to_string(), |e| e.id().to_string()),
                                entry.id()
                            ),
                        });
                    }
                }
                (Some(entry), None) => {
                    return Err(RollerError::OutOfSync {
                        position,
                        detail: format!("no panel for entry {}", entry.id()),
                    });
                }
                (None, Some(panel)) => {
                    return Err(RollerError::OutOfSync {
                        position,
                        detail: format!("{} has no entry", panel.id()),
                    });
                }
                (None, None) => {}
            }
        }
        Ok(())
    }
}

impl<M> fmt::Debug for Roller<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Roller")
            .field("controller", &self.inner.controller)
            .field("stack", &self.inner.stack)
            .field("is_editing", &self.inner.editing.get())
            .field("presentation", &self.inner.presentation.get())
            .field("synced", &self.inner.synced.get())
            .finish()
    }
}

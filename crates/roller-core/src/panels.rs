#![forbid(unsafe_code)]

//! Ordered panel container with an active index.
//!
//! A [`PanelStack`] holds panels in creation order and tracks which one is
//! visible. Its layout is computed lazily by a pluggable [`Arranger`]:
//!
//! - changing the index re-arranges immediately;
//! - adding a panel does **not**. The cached layout keeps describing the old
//!   membership until [`PanelStack::relayout`] is called.
//!
//! The index never points past the last panel. Without `wrap` it clamps to
//! `[0, len - 1]`; with `wrap` it is reduced modulo `len`. An empty stack
//! holds index 0.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use roller_reactive::{Endpoint, Observable, Subscription};
use tracing::trace;

use crate::arranger::{Arranger, Placement};
use crate::collection::Entry;
use crate::config::RollerConfig;

/// Identity of a panel, unique within its stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u64);

impl PanelId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel-{}", self.0)
    }
}

/// Description of a child to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSpec {
    pub kind: String,
}

impl PanelSpec {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self::new("roller-panel")
    }
}

/// Per-panel controller. Holds a reference to the backing entry.
pub struct PanelController<M> {
    model: Observable<Option<Entry<M>>>,
}

impl<M> Clone for PanelController<M> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
        }
    }
}

impl<M: 'static> PanelController<M> {
    fn new() -> Self {
        Self {
            model: Observable::new(None),
        }
    }

    #[must_use]
    pub fn model(&self) -> Option<Entry<M>> {
        self.model.get()
    }

    pub fn set_model(&self, entry: Entry<M>) -> bool {
        self.model.set(Some(entry))
    }

    /// The `model` property, for views that render the entry.
    #[must_use]
    pub fn model_property(&self) -> Observable<Option<Entry<M>>> {
        self.model.clone()
    }
}

/// One page of the stack.
pub struct Panel<M> {
    id: PanelId,
    kind: Rc<str>,
    controller: PanelController<M>,
}

impl<M> Clone for Panel<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            kind: Rc::clone(&self.kind),
            controller: self.controller.clone(),
        }
    }
}

impl<M: 'static> Panel<M> {
    #[must_use]
    pub fn id(&self) -> PanelId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn controller(&self) -> &PanelController<M> {
        &self.controller
    }
}

impl<M: fmt::Debug + 'static> fmt::Debug for Panel<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("model", &self.controller.model())
            .finish()
    }
}

struct StackShared<M> {
    panels: RefCell<Vec<Panel<M>>>,
    index: Observable<usize>,
    arranger: Box<dyn Arranger>,
    extent: u16,
    wrap: bool,
    layout: RefCell<Vec<Placement>>,
    layout_passes: Cell<u64>,
    next_id: Cell<u64>,
}

/// Shared handle to a panel stack.
pub struct PanelStack<M> {
    shared: Rc<StackShared<M>>,
}

impl<M> Clone for PanelStack<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<M> fmt::Debug for PanelStack<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelStack")
            .field("len", &self.shared.panels.borrow().len())
            .field("index", &self.shared.index.get())
            .field("arranger", &self.shared.arranger.name())
            .field("wrap", &self.shared.wrap)
            .field("layout_passes", &self.shared.layout_passes.get())
            .finish()
    }
}

impl<M: 'static> PanelStack<M> {
    /// Empty stack arranged by `arranger` in a viewport of `extent` cells.
    #[must_use]
    pub fn new(arranger: Box<dyn Arranger>, extent: u16, wrap: bool) -> Self {
        Self {
            shared: Rc::new(StackShared {
                panels: RefCell::new(Vec::new()),
                index: Observable::new(0),
                arranger,
                extent,
                wrap,
                layout: RefCell::new(Vec::new()),
                layout_passes: Cell::new(0),
                next_id: Cell::new(0),
            }),
        }
    }

    #[must_use]
    pub fn from_config(config: &RollerConfig) -> Self {
        Self::new(config.arranger.build(), config.max_height, config.wrap)
    }

    /// Append a new child. The cached layout is left untouched.
    pub fn create_child(&self, spec: PanelSpec) -> Panel<M> {
        let id = PanelId(self.shared.next_id.get());
        self.shared.next_id.set(id.0 + 1);
        let panel = Panel {
            id,
            kind: Rc::from(spec.kind),
            controller: PanelController::new(),
        };
        self.shared.panels.borrow_mut().push(panel.clone());
        trace!(panel_id = id.get(), kind = %panel.kind, "panel created");
        panel
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.panels.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn panels(&self) -> Vec<Panel<M>> {
        self.shared.panels.borrow().clone()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<Panel<M>> {
        self.shared.panels.borrow().get(position).cloned()
    }

    /// The panel currently in view.
    #[must_use]
    pub fn active(&self) -> Option<Panel<M>> {
        self.get(self.index())
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.shared.index.get()
    }

    /// Move to `index` after clamping or wrapping it. Returns whether the
    /// stored index changed.
    pub fn set_index(&self, index: usize) -> bool {
        let target = self.normalize(index);
        let changed = self.shared.index.set(target);
        if changed {
            self.arrange();
        }
        changed
    }

    pub fn next(&self) -> bool {
        self.set_index(self.index().saturating_add(1))
    }

    pub fn previous(&self) -> bool {
        let len = self.len();
        let index = self.index();
        match index.checked_sub(1) {
            Some(prev) => self.set_index(prev),
            None if self.shared.wrap && len > 0 => self.set_index(len - 1),
            None => false,
        }
    }

    /// The `index` property as a binding endpoint. Writes go through
    /// [`set_index`](Self::set_index).
    #[must_use]
    pub fn index_endpoint(&self) -> PanelIndex<M> {
        PanelIndex {
            stack: self.clone(),
        }
    }

    /// Recompute the layout for the current membership.
    pub fn relayout(&self) {
        self.arrange();
    }

    /// Placements from the last layout pass.
    #[must_use]
    pub fn layout(&self) -> Vec<Placement> {
        self.shared.layout.borrow().clone()
    }

    /// True when the cached layout covers every panel.
    #[must_use]
    pub fn is_layout_current(&self) -> bool {
        self.shared.layout.borrow().len() == self.len()
    }

    #[must_use]
    pub fn layout_passes(&self) -> u64 {
        self.shared.layout_passes.get()
    }

    #[must_use]
    pub fn arranger_name(&self) -> &'static str {
        self.shared.arranger.name()
    }

    /// The index [`set_index`](Self::set_index) would store for `index`.
    #[must_use]
    pub fn normalize(&self, index: usize) -> usize {
        let len = self.len();
        if len == 0 {
            0
        } else if self.shared.wrap {
            index % len
        } else {
            index.min(len - 1)
        }
    }

    fn arrange(&self) {
        let count = self.len();
        let active = self.index();
        let placements = self
            .shared
            .arranger
            .arrange(count, active, self.shared.extent);
        *self.shared.layout.borrow_mut() = placements;
        let passes = self.shared.layout_passes.get() + 1;
        self.shared.layout_passes.set(passes);
        trace!(
            arranger = self.shared.arranger.name(),
            count, active, passes, "layout pass"
        );
    }
}

/// Binding endpoint for a stack's index.
pub struct PanelIndex<M> {
    stack: PanelStack<M>,
}

impl<M> Clone for PanelIndex<M> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
        }
    }
}

impl<M: 'static> Endpoint<usize> for PanelIndex<M> {
    fn get(&self) -> usize {
        self.stack.index()
    }

    fn set(&self, value: usize) -> bool {
        self.stack.set_index(value)
    }

    fn subscribe(&self, callback: impl Fn(&usize) + 'static) -> Subscription {
        self.stack.shared.index.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arranger::{CardArranger, TopBottomArranger};

    fn stack(wrap: bool, panels: usize) -> PanelStack<()> {
        let stack = PanelStack::new(Box::new(TopBottomArranger), 100, wrap);
        for _ in 0..panels {
            stack.create_child(PanelSpec::default());
        }
        stack
    }

    #[test]
    fn children_get_sequential_ids_and_kind() {
        let stack = stack(false, 0);
        let a = stack.create_child(PanelSpec::new("page"));
        let b = stack.create_child(PanelSpec::default());
        assert_eq!(a.id().get() + 1, b.id().get());
        assert_eq!(a.kind(), "page");
        assert_eq!(b.kind(), "roller-panel");
        assert!(a.controller().model().is_none());
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn membership_change_leaves_layout_stale_until_relayout() {
        let stack = stack(false, 2);
        assert!(!stack.is_layout_current());
        assert_eq!(stack.layout_passes(), 0);

        stack.relayout();
        assert!(stack.is_layout_current());
        assert_eq!(stack.layout().len(), 2);

        stack.create_child(PanelSpec::default());
        assert!(!stack.is_layout_current());
        stack.relayout();
        assert_eq!(stack.layout_passes(), 2);
    }

    #[test]
    fn index_clamps_without_wrap() {
        let stack = stack(false, 3);
        assert!(stack.set_index(10));
        assert_eq!(stack.index(), 2);
        assert!(!stack.next());
        assert!(stack.previous());
        assert_eq!(stack.index(), 1);
        stack.set_index(0);
        assert!(!stack.previous());
    }

    #[test]
    fn index_wraps_with_wrap() {
        let stack = stack(true, 3);
        stack.set_index(2);
        assert!(stack.next());
        assert_eq!(stack.index(), 0);
        assert!(stack.previous());
        assert_eq!(stack.index(), 2);
        stack.set_index(7);
        assert_eq!(stack.index(), 1);
    }

    #[test]
    fn empty_stack_stays_at_zero() {
        let stack = stack(true, 0);
        assert!(!stack.set_index(4));
        assert!(!stack.next());
        assert!(!stack.previous());
        assert_eq!(stack.index(), 0);
        assert!(stack.active().is_none());
    }

    #[test]
    fn index_change_rearranges() {
        let stack = stack(false, 3);
        stack.relayout();
        stack.set_index(1);
        let visible: Vec<usize> = stack
            .layout()
            .iter()
            .filter(|p| p.visible)
            .map(|p| p.panel)
            .collect();
        assert_eq!(visible, vec![1]);
        assert_eq!(stack.layout()[1].y, 0);
    }

    #[test]
    fn endpoint_writes_are_normalised() {
        let stack = stack(false, 2);
        let endpoint = stack.index_endpoint();
        assert!(endpoint.set(9));
        assert_eq!(endpoint.get(), 1);
        assert!(!endpoint.set(1));
    }

    #[test]
    fn controller_model_is_shared_by_clones() {
        let stack: PanelStack<()> = PanelStack::new(Box::new(CardArranger), 10, false);
        let panel = stack.create_child(PanelSpec::default());
        let again = stack.get(0).expect("panel");
        let model = again.controller().model_property();
        assert!(model.get().is_none());
        assert_eq!(panel.id(), again.id());
        assert_eq!(stack.arranger_name(), "card");
    }

    #[test]
    fn from_config_uses_configured_arranger() {
        let config = RollerConfig {
            arranger: crate::config::ArrangerKind::LeftRight,
            ..RollerConfig::default()
        };
        let stack: PanelStack<u8> = PanelStack::from_config(&config);
        assert_eq!(stack.arranger_name(), "left_right");
    }
}

#![forbid(unsafe_code)]

//! Ordered model collection with a current index and an editing flag.
//!
//! A [`CollectionController`] owns the entries that panels are generated
//! from. Insertion order is panel order. Entries are appended, never
//! reordered or removed.
//!
//! # Notifications
//!
//! | Notification  | Fired by            | When                              |
//! |---------------|---------------------|-----------------------------------|
//! | `ready`       | [`mark_ready`]      | once, after the initial load      |
//! | `entry-added` | [`add`]             | after every append                |
//!
//! Listeners are typed callbacks registered through [`on_ready`] and
//! [`on_entry_added`]. They run synchronously, in registration order, and
//! may fail; the first failure is handed back to whoever triggered the
//! notification once every listener has run.
//!
//! [`mark_ready`]: CollectionController::mark_ready
//! [`add`]: CollectionController::add
//! [`on_ready`]: CollectionController::on_ready
//! [`on_entry_added`]: CollectionController::on_entry_added

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use roller_reactive::{Observable, Subscription};
use tracing::debug;

use crate::error::Result;

/// Identity of an entry, unique within its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

impl EntryId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to one model record held by a collection.
///
/// Cloning is cheap and shares the record. Two handles are equal when they
/// name the same entry, whatever the record contents.
pub struct Entry<M> {
    id: EntryId,
    record: Rc<M>,
}

impl<M> Entry<M> {
    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    #[must_use]
    pub fn record(&self) -> &M {
        &self.record
    }
}

impl<M> Clone for Entry<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            record: Rc::clone(&self.record),
        }
    }
}

impl<M> PartialEq for Entry<M> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<M> Eq for Entry<M> {}

impl<M: fmt::Debug> fmt::Debug for Entry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("record", &self.record)
            .finish()
    }
}

type ReadyListener = dyn Fn() -> Result<()>;
type AddedListener<M> = dyn Fn(&Entry<M>) -> Result<()>;

struct Shared<M> {
    entries: RefCell<Vec<Entry<M>>>,
    next_id: Cell<u64>,
    index: Observable<usize>,
    editing: Observable<bool>,
    ready: Cell<bool>,
    ready_listeners: RefCell<Vec<Weak<ReadyListener>>>,
    added_listeners: RefCell<Vec<Weak<AddedListener<M>>>>,
}

/// Shared handle to an ordered, append-only model collection.
///
/// Cloning the controller yields another handle to the same collection.
pub struct CollectionController<M> {
    shared: Rc<Shared<M>>,
}

impl<M> Clone for CollectionController<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<M: 'static> Default for CollectionController<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for CollectionController<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionController")
            .field("len", &self.shared.entries.borrow().len())
            .field("index", &self.shared.index.get())
            .field("is_editing", &self.shared.editing.get())
            .field("ready", &self.shared.ready.get())
            .finish()
    }
}

impl<M: 'static> CollectionController<M> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                index: Observable::new(0),
                editing: Observable::new(false),
                ready: Cell::new(false),
                ready_listeners: RefCell::new(Vec::new()),
                added_listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    fn push(&self, record: M) -> Entry<M> {
        let id = EntryId(self.shared.next_id.get());
        self.shared.next_id.set(id.0 + 1);
        let entry = Entry {
            id,
            record: Rc::new(record),
        };
        self.shared.entries.borrow_mut().push(entry.clone());
        entry
    }

    /// Append `records` without notifying anyone.
    ///
    /// Used for the initial load; listeners learn about these entries
    /// through the `ready` notification instead.
    pub fn load_silently(&self, records: impl IntoIterator<Item = M>) -> Vec<Entry<M>> {
        let loaded: Vec<Entry<M>> = records.into_iter().map(|r| self.push(r)).collect();
        debug!(loaded = loaded.len(), "collection loaded silently");
        loaded
    }

    /// Fire `ready`. Only the first call notifies; later calls return
    /// `Ok(false)`.
    pub fn mark_ready(&self) -> Result<bool> {
        if self.shared.ready.replace(true) {
            return Ok(false);
        }
        debug!(entries = self.len(), "collection ready");
        let listeners = live(&self.shared.ready_listeners);
        first_error(listeners.iter().map(|listener| listener()))?;
        Ok(true)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shared.ready.get()
    }

    /// Append `record` and fire `entry-added` with the new entry.
    ///
    /// The entry stays in the collection even if a listener fails.
    pub fn add(&self, record: M) -> Result<Entry<M>> {
        let entry = self.push(record);
        debug!(entry_id = entry.id.get(), len = self.len(), "entry added");
        let listeners = live(&self.shared.added_listeners);
        first_error(listeners.iter().map(|listener| listener(&entry)))?;
        Ok(entry)
    }

    /// Snapshot of all entries in order.
    #[must_use]
    pub fn models(&self) -> Vec<Entry<M>> {
        self.shared.entries.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<Entry<M>> {
        self.shared.entries.borrow().get(position).cloned()
    }

    /// Position of `entry`, or `None` if it belongs to another collection.
    #[must_use]
    pub fn index_of(&self, entry: &Entry<M>) -> Option<usize> {
        self.shared
            .entries
            .borrow()
            .iter()
            .position(|candidate| candidate == entry && Rc::ptr_eq(&candidate.record, &entry.record))
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.shared.index.get()
    }

    pub fn set_index(&self, index: usize) -> bool {
        self.shared.index.set(index)
    }

    /// The `index` property, for binding.
    #[must_use]
    pub fn index_property(&self) -> Observable<usize> {
        self.shared.index.clone()
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.shared.editing.get()
    }

    pub fn set_editing(&self, editing: bool) -> bool {
        self.shared.editing.set(editing)
    }

    /// The `isEditing` property, for binding.
    #[must_use]
    pub fn editing_property(&self) -> Observable<bool> {
        self.shared.editing.clone()
    }

    /// Run `listener` when the collection becomes ready.
    ///
    /// Registering after `ready` has fired is allowed but the listener will
    /// never run; check [`is_ready`](Self::is_ready) first.
    pub fn on_ready(&self, listener: impl Fn() -> Result<()> + 'static) -> Subscription {
        let strong: Rc<ReadyListener> = Rc::new(listener);
        self.shared
            .ready_listeners
            .borrow_mut()
            .push(Rc::downgrade(&strong));
        Subscription::hold(strong)
    }

    /// Run `listener` with every entry appended through [`add`](Self::add).
    pub fn on_entry_added(
        &self,
        listener: impl Fn(&Entry<M>) -> Result<()> + 'static,
    ) -> Subscription {
        let strong: Rc<AddedListener<M>> = Rc::new(listener);
        self.shared
            .added_listeners
            .borrow_mut()
            .push(Rc::downgrade(&strong));
        Subscription::hold(strong)
    }
}

/// Prune dropped listeners and upgrade the rest, releasing the borrow
/// before any of them runs.
fn live<L: ?Sized>(listeners: &RefCell<Vec<Weak<L>>>) -> Vec<Rc<L>> {
    let mut listeners = listeners.borrow_mut();
    listeners.retain(|w| w.strong_count() > 0);
    listeners.iter().filter_map(Weak::upgrade).collect()
}

/// Drive every result to completion, keeping the first error.
fn first_error(results: impl Iterator<Item = Result<()>>) -> Result<()> {
    let mut first = Ok(());
    for result in results {
        if let Err(err) = result
            && first.is_ok()
        {
            first = Err(err);
        }
    }
    first
}

//! Source-side geometry: where every tagged source element was last laid out.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::geometry::Frame;
use crate::snapshot::Snapshot;
use crate::transition::TransitionState;

/// Opaque token pairing a source element with its destination.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchId(Arc<str>);

impl MatchId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MatchId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl fmt::Debug for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a tagged element looked like and where it was.
#[derive(Clone, Debug)]
pub struct MatchedRecord {
    pub snapshot: Snapshot,
    pub frame: Frame,
}

/// Frames keyed by id, ordered so iteration (and painting) is stable.
pub type FrameSet = BTreeMap<MatchId, Frame>;

#[derive(Default)]
struct RegistryInner {
    records: HashMap<MatchId, MatchedRecord>,
    pass: u64,
    /// State of the cycle currently using these sources, if any
    active: Option<TransitionState>,
}

/// Registry of source elements, rebuilt on every layout pass.
#[derive(Clone, Default)]
pub struct GeometryRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl GeometryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a layout pass. Entries from the previous pass are superseded.
    pub fn begin_pass(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.records.clear();
        inner.pass += 1;
    }

    pub fn pass(&self) -> u64 {
        self.inner.borrow().pass
    }

    /// Publish an element's snapshot and frame. The last write for an id wins.
    pub fn register(&self, id: MatchId, snapshot: Snapshot, frame: Frame) {
        log::trace!("source {} at {:?}", id, frame);
        self.inner
            .borrow_mut()
            .records
            .insert(id, MatchedRecord { snapshot, frame });
    }

    pub fn get(&self, id: &MatchId) -> Option<MatchedRecord> {
        self.inner.borrow().records.get(id).cloned()
    }

    pub fn frame(&self, id: &MatchId) -> Option<Frame> {
        self.inner.borrow().records.get(id).map(|r| r.frame)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the current records; used as a transition's source set.
    pub fn capture(&self) -> BTreeMap<MatchId, MatchedRecord> {
        self.inner
            .borrow()
            .records
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    pub(crate) fn set_active(&self, state: Option<TransitionState>) {
        self.inner.borrow_mut().active = state;
    }

    /// The transition state of the in-flight cycle, if any.
    pub fn active(&self) -> Option<TransitionState> {
        self.inner.borrow().active.clone()
    }
}

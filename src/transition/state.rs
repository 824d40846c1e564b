//! Shared, observable state of one presentation/dismissal cycle.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use bitflags::bitflags;

use crate::error::{HeroError, Result};
use crate::geometry::Frame;
use crate::reactive::{Observe, ObserverList, Subscription};
use crate::registry::{FrameSet, MatchId, MatchedRecord};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionMode {
    /// No cycle has started, or the last one finished dismissing.
    #[default]
    Idle,
    Presenting,
    Dismissing,
}

bitflags! {
    /// Which parts of the state a mutation touched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StateChange: u8 {
        const MODE = 1 << 0;
        const ANIMATING = 1 << 1;
        const CURRENT_FRAMES = 1 << 2;
        const DESTINATIONS = 1 << 3;
        const SOURCES = 1 << 4;
    }
}

#[derive(Default)]
struct StateData {
    mode: TransitionMode,
    animating: bool,
    cycle_open: bool,
    sources: BTreeMap<MatchId, MatchedRecord>,
    destinations: BTreeMap<MatchId, MatchedRecord>,
    current_frames: FrameSet,
}

struct StateShared {
    data: RefCell<StateData>,
    observers: ObserverList<TransitionState, StateChange>,
}

/// Observable state shared by the animator, the overlay and destination elements.
///
/// Every mutation notifies subscribers synchronously. Observers receive the
/// state as an argument and should not capture a strong handle to it.
#[derive(Clone)]
pub struct TransitionState {
    shared: Rc<StateShared>,
}

impl Default for TransitionState {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionState {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(StateShared {
                data: RefCell::new(StateData::default()),
                observers: ObserverList::new(),
            }),
        }
    }

    /// Open a cycle tracking `sources`. Only one cycle may be open at a time.
    pub fn begin_cycle(&self, sources: BTreeMap<MatchId, MatchedRecord>) -> Result<()> {
        {
            let mut data = self.shared.data.borrow_mut();
            if data.cycle_open {
                return Err(HeroError::CycleInFlight);
            }
            log::debug!("cycle begins with sources {:?}", sources.keys());
            data.cycle_open = true;
            data.sources = sources;
            data.destinations.clear();
            data.current_frames.clear();
        }
        self.emit(StateChange::SOURCES | StateChange::DESTINATIONS | StateChange::CURRENT_FRAMES);
        Ok(())
    }

    /// Close the cycle and return to [`TransitionMode::Idle`].
    pub fn end_cycle(&self) {
        let changed = {
            let mut data = self.shared.data.borrow_mut();
            data.cycle_open = false;
            std::mem::replace(&mut data.mode, TransitionMode::Idle) != TransitionMode::Idle
        };
        if changed {
            self.emit(StateChange::MODE);
        }
    }

    pub fn is_cycle_open(&self) -> bool {
        self.shared.data.borrow().cycle_open
    }

    pub fn set_destination(&self, id: MatchId, snapshot: Snapshot, frame: Frame) {
        log::trace!("destination {} at {:?}", id, frame);
        self.shared
            .data
            .borrow_mut()
            .destinations
            .insert(id, MatchedRecord { snapshot, frame });
        self.emit(StateChange::DESTINATIONS);
    }

    /// Replace the whole current-frame set. The keys must be exactly the
    /// tracked source ids.
    pub fn set_current_frames(&self, frames: FrameSet) -> Result<()> {
        {
            let mut data = self.shared.data.borrow_mut();
            let missing: Vec<MatchId> = data
                .sources
                .keys()
                .filter(|id| !frames.contains_key(*id))
                .cloned()
                .collect();
            let unexpected: Vec<MatchId> = frames
                .keys()
                .filter(|id| !data.sources.contains_key(*id))
                .cloned()
                .collect();
            if !missing.is_empty() || !unexpected.is_empty() {
                return Err(HeroError::PartialFrameSet {
                    missing,
                    unexpected,
                });
            }
            data.current_frames = frames;
        }
        self.emit(StateChange::CURRENT_FRAMES);
        Ok(())
    }

    pub fn set_animating(&self, animating: bool) {
        let changed = {
            let mut data = self.shared.data.borrow_mut();
            std::mem::replace(&mut data.animating, animating) != animating
        };
        if changed {
            self.emit(StateChange::ANIMATING);
        }
    }

    pub fn set_mode(&self, mode: TransitionMode) {
        let changed = {
            let mut data = self.shared.data.borrow_mut();
            std::mem::replace(&mut data.mode, mode) != mode
        };
        if changed {
            self.emit(StateChange::MODE);
        }
    }

    pub fn mode(&self) -> TransitionMode {
        self.shared.data.borrow().mode
    }

    pub fn is_animating(&self) -> bool {
        self.shared.data.borrow().animating
    }

    pub fn current_frames(&self) -> FrameSet {
        self.shared.data.borrow().current_frames.clone()
    }

    pub fn current_frame(&self, id: &MatchId) -> Option<Frame> {
        self.shared.data.borrow().current_frames.get(id).copied()
    }

    pub fn tracked_ids(&self) -> Vec<MatchId> {
        self.shared.data.borrow().sources.keys().cloned().collect()
    }

    pub fn source(&self, id: &MatchId) -> Option<MatchedRecord> {
        self.shared.data.borrow().sources.get(id).cloned()
    }

    pub fn destination(&self, id: &MatchId) -> Option<MatchedRecord> {
        self.shared.data.borrow().destinations.get(id).cloned()
    }

    pub fn source_frames(&self) -> FrameSet {
        self.shared
            .data
            .borrow()
            .sources
            .iter()
            .map(|(id, record)| (id.clone(), record.frame))
            .collect()
    }

    /// Destination frames of every tracked id, or `None` until all have reported.
    pub fn destination_frames(&self) -> Option<FrameSet> {
        let data = self.shared.data.borrow();
        data.sources
            .keys()
            .map(|id| data.destinations.get(id).map(|r| (id.clone(), r.frame)))
            .collect()
    }

    /// Readiness predicate: every source id has a destination record.
    pub fn is_ready(&self) -> bool {
        let data = self.shared.data.borrow();
        data.sources.keys().all(|id| data.destinations.contains_key(id))
    }

    pub fn missing_destinations(&self) -> Vec<MatchId> {
        let data = self.shared.data.borrow();
        data.sources
            .keys()
            .filter(|id| !data.destinations.contains_key(*id))
            .cloned()
            .collect()
    }

    /// Observe every mutation.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&TransitionState, StateChange) -> Observe + 'static,
    {
        self.shared.observers.subscribe(callback)
    }

    /// Run `callback` once, the first time `predicate` holds after a change
    /// in `filter`, then unsubscribe.
    pub fn once_when<P, F>(&self, filter: StateChange, predicate: P, callback: F) -> Subscription
    where
        P: Fn(&TransitionState) -> bool + 'static,
        F: FnOnce(&TransitionState) + 'static,
    {
        let mut callback = Some(callback);
        self.subscribe(move |state, change| {
            if !change.intersects(filter) || !predicate(state) {
                return Observe::Keep;
            }
            if let Some(callback) = callback.take() {
                callback(state);
            }
            Observe::Remove
        })
    }

    pub fn observer_count(&self) -> usize {
        self.shared.observers.len()
    }

    fn emit(&self, change: StateChange) {
        self.shared.observers.notify(self, change);
    }
}

impl std::fmt::Debug for TransitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.shared.data.borrow();
        f.debug_struct("TransitionState")
            .field("mode", &data.mode)
            .field("animating", &data.animating)
            .field("current_frames", &data.current_frames)
            .finish()
    }
}

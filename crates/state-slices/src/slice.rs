//! Slice descriptor
//!
//! A [`Slice`] bundles a name, an initial state and a reducer with whatever
//! action creators and selectors the caller wants to expose. Those bundles are
//! plain user types (`C` and `Sel`), empty `()` by default.

use std::sync::Arc;

use crate::action::Action;
use crate::error::Result;
use crate::reducer::SliceReducer;
use crate::selector::sub_state;
use crate::state::{RootState, SliceState};

#[derive(Debug)]
pub struct Slice<S, C = (), Sel = ()> {
    name: String,
    initial_state: Arc<S>,
    reducer: SliceReducer<S>,
    action_creators: C,
    selectors: Sel,
}

impl<S: SliceState> Slice<S> {
    pub(crate) fn new(name: String, initial_state: Arc<S>, reducer: SliceReducer<S>) -> Self {
        log::debug!("Created slice {}", name);
        Self {
            name,
            initial_state,
            reducer,
            action_creators: (),
            selectors: (),
        }
    }
}

impl<S: SliceState, C, Sel> Slice<S, C, Sel> {
    pub fn with_action_creators<C2>(self, action_creators: C2) -> Slice<S, C2, Sel> {
        Slice {
            name: self.name,
            initial_state: self.initial_state,
            reducer: self.reducer,
            action_creators,
            selectors: self.selectors,
        }
    }

    pub fn with_selectors<Sel2>(self, selectors: Sel2) -> Slice<S, C, Sel2> {
        Slice {
            name: self.name,
            initial_state: self.initial_state,
            reducer: self.reducer,
            action_creators: self.action_creators,
            selectors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_state(&self) -> &Arc<S> {
        &self.initial_state
    }

    pub fn reducer(&self) -> &SliceReducer<S> {
        &self.reducer
    }

    pub fn action_creators(&self) -> &C {
        &self.action_creators
    }

    pub fn selectors(&self) -> &Sel {
        &self.selectors
    }

    pub fn reduce(&self, state: Option<Arc<S>>, action: &Action) -> Arc<S> {
        self.reducer.reduce(state, action)
    }

    /// Sub-state of this slice within `root`, the initial state if absent
    pub fn get_state(&self, root: &RootState) -> Result<Arc<S>> {
        sub_state(root, &self.name, &self.initial_state)
    }

    /// Reduce this slice's entry of `root`.
    ///
    /// Returns `root` itself when the sub-state kept its identity, otherwise a
    /// new root with only this slice's entry replaced.
    pub fn reduce_in(&self, root: &RootState, action: &Action) -> Result<RootState> {
        let current = root.slice::<S>(&self.name)?;
        let next = self.reducer.reduce(current.clone(), action);

        match current {
            Some(current) if Arc::ptr_eq(&current, &next) => Ok(root.clone()),
            _ => Ok(root.with_slice(self.name.clone(), next)),
        }
    }
}

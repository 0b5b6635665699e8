//! Parent state keyed by slice name
//!
//! Slices only ever see their own sub-state. The composed state that holds all
//! of them is a persistent map from slice name to a type-erased `Arc`, so
//! reading a sub-state hands out the same allocation that was stored and
//! identity checks (`Arc::ptr_eq`) survive the round trip.

use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SliceError};

/// Marker for values that can live in a [`RootState`]
pub trait SliceState: Any + Send + Sync {}

impl<T: Any + Send + Sync> SliceState for T {}

type ErasedState = Arc<dyn Any + Send + Sync>;

/// Composed state of several slices.
///
/// Cloning is cheap and keeps identity: two clones are [`RootState::ptr_eq`].
#[derive(Clone, Default)]
pub struct RootState {
    slices: Arc<BTreeMap<String, ErasedState>>,
}

impl RootState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a state with `name` set to `state`, leaving `self` untouched
    pub fn with_slice<S: SliceState>(&self, name: impl Into<String>, state: Arc<S>) -> Self {
        let mut slices = (*self.slices).clone();
        slices.insert(name.into(), state as ErasedState);
        Self {
            slices: Arc::new(slices),
        }
    }

    /// Read the sub-state stored under `name`.
    ///
    /// Absent slices are `Ok(None)`; a slice stored with another type is an error.
    pub fn slice<S: SliceState>(&self, name: &str) -> Result<Option<Arc<S>>> {
        match self.slices.get(name) {
            Some(state) => Arc::clone(state)
                .downcast::<S>()
                .map(Some)
                .map_err(|_| SliceError::StateTypeMismatch {
                    slice: name.to_string(),
                    expected: type_name::<S>(),
                }),
            None => Ok(None),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slices.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Whether both values are the very same state, not merely equal ones
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.slices, &b.slices)
    }
}

impl fmt::Debug for RootState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootState")
            .field("slices", &self.slices.keys().collect::<Vec<_>>())
            .finish()
    }
}

//! Slice builder
//!
//! Everything created here is bound to one slice name: action types are
//! prefixed as `"{name}/{local}"`, selectors read `root[name]`, and reducers
//! fall back to the slice's initial state.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::action::ActionCreator;
use crate::error::{Result, SliceError};
use crate::reducer::{ReducerHandler, SliceReducer};
use crate::selector::{sub_state, MemoizedSelector, Selector};
use crate::slice::Slice;
use crate::state::{RootState, SliceState};

/// Local name of the lifecycle action every slice owns
pub const RESET_ACTION: &str = "reset";

fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "must be a non-empty string"
    } else if name.contains('/') {
        "must not contain '/'"
    } else {
        return Ok(());
    };

    Err(SliceError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Creates the action creators, selectors and reducer of one slice
#[derive(Debug)]
pub struct SliceBuilder<S> {
    name: String,
    initial_state: Arc<S>,
    reset: ActionCreator<()>,
    action_types: BTreeMap<String, String>,
}

impl<S: SliceState> SliceBuilder<S> {
    pub fn new(name: impl Into<String>, initial_state: S) -> Result<Self> {
        Self::with_shared_state(name, Arc::new(initial_state))
    }

    /// Use an initial state that is already shared elsewhere
    pub fn with_shared_state(name: impl Into<String>, initial_state: Arc<S>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        let reset_type = format!("{}/{}", name, RESET_ACTION);
        let mut action_types = BTreeMap::new();
        action_types.insert(RESET_ACTION.to_string(), reset_type.clone());

        log::debug!("Created slice builder {}", name);

        Ok(Self {
            name,
            initial_state,
            reset: ActionCreator::new(reset_type),
            action_types,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_state(&self) -> &Arc<S> {
        &self.initial_state
    }

    /// Creator for the reserved `"{name}/reset"` action
    pub fn reset(&self) -> &ActionCreator<()> {
        &self.reset
    }

    /// Local name to namespaced type, for every action created so far
    pub fn action_types(&self) -> &BTreeMap<String, String> {
        &self.action_types
    }

    /// Create an action creator for `"{name}/{local_type}"`.
    ///
    /// Attach payload and meta derivation with [`ActionCreator::with_payload`]
    /// and [`ActionCreator::with_meta`].
    pub fn create_action<T>(&mut self, local_type: &str) -> Result<ActionCreator<T>> {
        if local_type.is_empty() {
            return Err(SliceError::InvalidActionType {
                slice: self.name.clone(),
            });
        }
        if local_type == RESET_ACTION {
            return Err(SliceError::ReservedActionType {
                slice: self.name.clone(),
                action_type: local_type.to_string(),
            });
        }

        let action_type = format!("{}/{}", self.name, local_type);
        self.action_types
            .insert(local_type.to_string(), action_type.clone());

        Ok(ActionCreator::new(action_type))
    }

    /// Selector over this slice's sub-state that derives on every call
    pub fn create_selector<A, R, F>(&self, derive: F) -> Selector<S, A, R>
    where
        F: Fn(&S, &[A]) -> R + 'static,
    {
        Selector::new(
            self.name.clone(),
            Arc::clone(&self.initial_state),
            Box::new(derive),
        )
    }

    /// Memoized selector comparing extra arguments with `PartialEq`
    pub fn create_memoized_selector<A, R, F>(&self, derive: F) -> MemoizedSelector<S, A, R>
    where
        A: PartialEq + Clone + 'static,
        F: Fn(&S, &[A]) -> R + 'static,
    {
        self.create_memoized_selector_with(derive, |previous: &A, next: &A| previous == next)
    }

    /// Memoized selector comparing extra arguments with `is_equal`
    pub fn create_memoized_selector_with<A, R, F, E>(
        &self,
        derive: F,
        is_equal: E,
    ) -> MemoizedSelector<S, A, R>
    where
        A: Clone,
        F: Fn(&S, &[A]) -> R + 'static,
        E: Fn(&A, &A) -> bool + 'static,
    {
        log::debug!("Created memoized selector for slice {}", self.name);
        MemoizedSelector::new(
            self.name.clone(),
            Arc::clone(&self.initial_state),
            Box::new(derive),
            Box::new(is_equal),
        )
    }

    /// Build the slice reducer from a whole-state function or a keyed table
    pub fn create_reducer(&self, handler: impl Into<ReducerHandler<S>>) -> Result<SliceReducer<S>> {
        SliceReducer::new(
            self.name.clone(),
            Arc::clone(&self.initial_state),
            self.reset.action_type().to_string(),
            handler.into(),
        )
    }

    /// Read this slice's sub-state, the initial state if it is absent
    pub fn get_state(&self, root: &RootState) -> Result<Arc<S>> {
        sub_state(root, &self.name, &self.initial_state)
    }

    /// Finish with the given reducer
    pub fn create_slice(self, reducer: SliceReducer<S>) -> Slice<S> {
        Slice::new(self.name, self.initial_state, reducer)
    }

    /// Finish without a reducer; the slice always yields its initial state
    pub fn build(self) -> Slice<S> {
        let reducer = SliceReducer::initial_only(
            self.name.clone(),
            Arc::clone(&self.initial_state),
            self.reset.action_type().to_string(),
        );
        self.create_slice(reducer)
    }
}

impl<S: SliceState + Default> SliceBuilder<S> {
    pub fn with_default_state(name: impl Into<String>) -> Result<Self> {
        Self::new(name, S::default())
    }
}

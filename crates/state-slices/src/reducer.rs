//! Reducer dispatch
//!
//! A slice reducer is built from either one whole-state function or a table of
//! per-action-type handlers. The choice is made once, when the reducer is
//! created; dispatch then either runs the function or looks the action type up
//! in the table. Unknown action types leave the state untouched and hand back
//! the very same `Arc`, which is what upstream change detection relies on.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::action::{Action, ActionCreator};
use crate::error::{Result, SliceError};

type HandlerFn<S> = Box<dyn Fn(Arc<S>, &Action) -> Arc<S>>;

/// Per-action-type handler table
pub struct KeyedHandlers<S> {
    handlers: HashMap<String, HandlerFn<S>>,
}

impl<S> KeyedHandlers<S> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Handle actions produced by `creator`
    pub fn on<T, F>(self, creator: &ActionCreator<T>, handler: F) -> Self
    where
        F: Fn(Arc<S>, &Action) -> Arc<S> + 'static,
    {
        self.on_type(creator.action_type(), handler)
    }

    /// Handle actions of an arbitrary type, e.g. one owned by another slice
    pub fn on_type<F>(mut self, action_type: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<S>, &Action) -> Arc<S> + 'static,
    {
        self.handlers.insert(action_type.into(), Box::new(handler));
        self
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.handlers.contains_key(action_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<S> Default for KeyedHandlers<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// How a slice reduces actions
pub enum ReducerHandler<S> {
    /// One function sees every action
    WholeState(HandlerFn<S>),
    /// Only actions with a registered type reach a handler
    Keyed(KeyedHandlers<S>),
}

impl<S> ReducerHandler<S> {
    pub fn whole_state<F>(reducer: F) -> Self
    where
        F: Fn(Arc<S>, &Action) -> Arc<S> + 'static,
    {
        Self::WholeState(Box::new(reducer))
    }
}

impl<S> From<KeyedHandlers<S>> for ReducerHandler<S> {
    fn from(handlers: KeyedHandlers<S>) -> Self {
        Self::Keyed(handlers)
    }
}

/// Reducer bound to one slice.
///
/// Calling it without a state substitutes the initial state. The `reset`
/// lifecycle action of the slice always yields the initial state unless a
/// keyed handler overrides it.
pub struct SliceReducer<S> {
    name: String,
    initial_state: Arc<S>,
    reset_type: String,
    handler: ReducerHandler<S>,
    current_state: RefCell<Arc<S>>,
}

impl<S: 'static> SliceReducer<S> {
    pub(crate) fn new(
        name: String,
        initial_state: Arc<S>,
        reset_type: String,
        handler: ReducerHandler<S>,
    ) -> Result<Self> {
        let handler = match handler {
            ReducerHandler::WholeState(reducer) => ReducerHandler::WholeState(reducer),
            ReducerHandler::Keyed(keyed) => {
                if keyed.contains("") {
                    return Err(SliceError::InvalidHandler {
                        slice: name,
                        reason: "action type keys must be non-empty".to_string(),
                    });
                }

                let initial = Arc::clone(&initial_state);
                let mut handlers: HashMap<String, HandlerFn<S>> = HashMap::new();
                handlers.insert(
                    reset_type.clone(),
                    Box::new(move |_: Arc<S>, _: &Action| Arc::clone(&initial)),
                );
                handlers.extend(keyed.handlers);
                ReducerHandler::Keyed(KeyedHandlers { handlers })
            }
        };

        log::debug!(
            "Created {} reducer for slice {}",
            match &handler {
                ReducerHandler::WholeState(_) => "whole-state",
                ReducerHandler::Keyed(_) => "keyed",
            },
            name
        );

        Ok(Self {
            current_state: RefCell::new(Arc::clone(&initial_state)),
            name,
            initial_state,
            reset_type,
            handler,
        })
    }

    /// Reducer used when a slice is built without one: always the initial state
    pub(crate) fn initial_only(name: String, initial_state: Arc<S>, reset_type: String) -> Self {
        let initial = Arc::clone(&initial_state);
        Self {
            current_state: RefCell::new(Arc::clone(&initial_state)),
            name,
            initial_state,
            reset_type,
            handler: ReducerHandler::whole_state(move |_, _| Arc::clone(&initial)),
        }
    }
}

impl<S> SliceReducer<S> {
    /// Compute the next state for `action`.
    ///
    /// Returns `state` itself (same allocation) when the action has no handler.
    pub fn reduce(&self, state: Option<Arc<S>>, action: &Action) -> Arc<S> {
        let state = state.unwrap_or_else(|| Arc::clone(&self.initial_state));

        let next = match &self.handler {
            ReducerHandler::WholeState(_) if action.action_type() == self.reset_type => {
                Arc::clone(&self.initial_state)
            }
            ReducerHandler::WholeState(reducer) => reducer(state, action),
            ReducerHandler::Keyed(keyed) => match keyed.handlers.get(action.action_type()) {
                Some(handler) => handler(state, action),
                None => {
                    log::trace!("{}: ignoring {}", self.name, action.action_type());
                    return state;
                }
            },
        };

        log::trace!("{}: reduced {}", self.name, action.action_type());
        *self.current_state.borrow_mut() = Arc::clone(&next);
        next
    }

    /// Last state produced by a handler, the initial state before that
    pub fn current_state(&self) -> Arc<S> {
        self.current_state.borrow().clone()
    }

    pub fn initial_state(&self) -> &Arc<S> {
        &self.initial_state
    }

    /// Whether `action_type` reaches a handler. Whole-state reducers see everything.
    pub fn handles(&self, action_type: &str) -> bool {
        match &self.handler {
            ReducerHandler::WholeState(_) => true,
            ReducerHandler::Keyed(keyed) => keyed.contains(action_type),
        }
    }
}

impl<S> fmt::Debug for SliceReducer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match &self.handler {
            ReducerHandler::WholeState(_) => "whole-state".to_string(),
            ReducerHandler::Keyed(keyed) => format!("keyed({})", keyed.len()),
        };
        f.debug_struct("SliceReducer")
            .field("slice", &self.name)
            .field("mode", &mode)
            .finish()
    }
}

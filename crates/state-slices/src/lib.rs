//! # state-slices
//!
//! Helpers for building modular state containers in the unidirectional data
//! flow style: namespaced action creators, reducers keyed by action type, and
//! memoized selectors, all bound to a named slice of a larger state.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use state_slices::{Action, KeyedHandlers, RootState, SliceBuilder};
//! use std::sync::Arc;
//!
//! let mut builder = SliceBuilder::new("counter", Counter { count: 0 })?;
//! let increment = builder.create_action::<()>("increment")?;
//!
//! let reducer = builder.create_reducer(KeyedHandlers::new().on(&increment, |state, _| {
//!     Arc::new(Counter { count: state.count + 1 })
//! }))?;
//! let doubled = builder.create_memoized_selector(|state: &Counter, _: &[()]| state.count * 2);
//! let slice = builder.create_slice(reducer);
//!
//! let root = slice.reduce_in(&RootState::new(), &increment.create(()))?;
//! assert_eq!(*doubled.select(&root, &[])?, 2);
//! ```
//!
//! Wiring several slices into one store is left to the caller: each slice only
//! knows its own entry of the [`RootState`].

pub mod action;
pub mod builder;
pub mod config;
pub mod error;
pub mod reducer;
pub mod selector;
pub mod slice;
pub mod state;

pub use action::{Action, ActionCreator, ActionError, Payload};
pub use builder::{SliceBuilder, RESET_ACTION};
pub use config::SliceConfig;
pub use error::{Result, SliceError};
pub use reducer::{KeyedHandlers, ReducerHandler, SliceReducer};
pub use selector::{MemoizedSelector, Selector};
pub use slice::Slice;
pub use state::{RootState, SliceState};

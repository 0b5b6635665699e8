//! Namespaced selectors
//!
//! A selector reads `root[slice name]` and hands that sub-state, plus any extra
//! arguments, to a derivation function. [`MemoizedSelector`] additionally keeps
//! the last result and only derives again when the sub-state is a different
//! allocation or the extra arguments are no longer equal.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::state::{RootState, SliceState};

type DeriveFn<S, A, R> = Box<dyn Fn(&S, &[A]) -> R>;
type EqualityFn<A> = Box<dyn Fn(&A, &A) -> bool>;

/// Read the slice's sub-state, coalescing an absent slice to the initial state
pub(crate) fn sub_state<S: SliceState>(
    root: &RootState,
    name: &str,
    initial_state: &Arc<S>,
) -> Result<Arc<S>> {
    Ok(root
        .slice::<S>(name)?
        .unwrap_or_else(|| Arc::clone(initial_state)))
}

/// Plain selector: derives on every call.
pub struct Selector<S, A, R> {
    name: String,
    initial_state: Arc<S>,
    derive: DeriveFn<S, A, R>,
}

impl<S: SliceState, A, R> Selector<S, A, R> {
    pub(crate) fn new(name: String, initial_state: Arc<S>, derive: DeriveFn<S, A, R>) -> Self {
        Self {
            name,
            initial_state,
            derive,
        }
    }

    pub fn select(&self, root: &RootState, args: &[A]) -> Result<R> {
        let state = sub_state(root, &self.name, &self.initial_state)?;
        Ok((self.derive)(&state, args))
    }
}

impl<S, A, R> fmt::Debug for Selector<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector").field("slice", &self.name).finish()
    }
}

/// Single-slot memo cell
struct MemoCache<S, A, R> {
    last_sub_state: Option<Arc<S>>,
    last_args: Vec<A>,
    last_result: Option<Arc<R>>,
}

impl<S, A, R> MemoCache<S, A, R> {
    fn empty() -> Self {
        Self {
            last_sub_state: None,
            last_args: Vec::new(),
            last_result: None,
        }
    }

    /// Cached result, if it was derived from this exact sub-state and equal arguments
    fn lookup(&self, state: &Arc<S>, args: &[A], is_equal: &dyn Fn(&A, &A) -> bool) -> Option<Arc<R>> {
        let same_state = self
            .last_sub_state
            .as_ref()
            .is_some_and(|last| Arc::ptr_eq(last, state));
        let same_args = args.len() == self.last_args.len()
            && self
                .last_args
                .iter()
                .zip(args)
                .all(|(previous, next)| is_equal(previous, next));

        if same_state && same_args {
            self.last_result.clone()
        } else {
            None
        }
    }
}

/// Selector that remembers its last result.
///
/// The sub-state is always compared by identity. Only the extra arguments go
/// through the configurable equality, which defaults to `PartialEq`.
pub struct MemoizedSelector<S, A, R> {
    name: String,
    initial_state: Arc<S>,
    derive: DeriveFn<S, A, R>,
    is_equal: EqualityFn<A>,
    cache: RefCell<MemoCache<S, A, R>>,
}

impl<S: SliceState, A: Clone, R> MemoizedSelector<S, A, R> {
    pub(crate) fn new(
        name: String,
        initial_state: Arc<S>,
        derive: DeriveFn<S, A, R>,
        is_equal: EqualityFn<A>,
    ) -> Self {
        Self {
            name,
            initial_state,
            derive,
            is_equal,
            cache: RefCell::new(MemoCache::empty()),
        }
    }

    /// Return the cached result, or derive, cache and return a new one
    pub fn select(&self, root: &RootState, args: &[A]) -> Result<Arc<R>> {
        let state = sub_state(root, &self.name, &self.initial_state)?;

        // Borrow is released before deriving so the derivation may use other selectors
        let cached = self.cache.borrow().lookup(&state, args, &*self.is_equal);
        if let Some(result) = cached {
            log::trace!("Selector for {}: cache hit", self.name);
            return Ok(result);
        }

        log::trace!("Selector for {}: recomputing", self.name);
        let result = Arc::new((self.derive)(&state, args));
        *self.cache.borrow_mut() = MemoCache {
            last_sub_state: Some(state),
            last_args: args.to_vec(),
            last_result: Some(Arc::clone(&result)),
        };

        Ok(result)
    }

    /// Drop the cached result; the next call derives unconditionally
    pub fn clear(&self) {
        *self.cache.borrow_mut() = MemoCache::empty();
    }
}

impl<S, A, R> fmt::Debug for MemoizedSelector<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizedSelector")
            .field("slice", &self.name)
            .field("cached", &self.cache.borrow().last_result.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        started: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Items {
        items: Vec<Item>,
    }

    fn initial() -> Arc<Items> {
        Arc::new(Items {
            items: (1..=3).map(|id| Item { id, started: false }).collect(),
        })
    }

    fn root_with(state: &Arc<Items>) -> RootState {
        RootState::new().with_slice("items", Arc::clone(state))
    }

    /// Memoized `items where id % modulus == 0`, counting derivations
    fn by_modulus(calls: &Rc<Cell<usize>>) -> MemoizedSelector<Items, u32, Vec<Item>> {
        let calls = Rc::clone(calls);
        MemoizedSelector::new(
            "items".to_string(),
            initial(),
            Box::new(move |state: &Items, args: &[u32]| {
                calls.set(calls.get() + 1);
                let modulus = args.first().copied().unwrap_or(2);
                state
                    .items
                    .iter()
                    .filter(|item| item.id % modulus == 0)
                    .cloned()
                    .collect()
            }),
            Box::new(|a: &u32, b: &u32| a == b),
        )
    }

    #[test]
    fn test_plain_selector_reads_slice() {
        let state = initial();
        let selector = Selector::new(
            "items".to_string(),
            initial(),
            Box::new(|state: &Items, _: &[()]| state.items.len()),
        );
        assert_eq!(selector.select(&root_with(&state), &[]).unwrap(), 3);
    }

    #[test]
    fn test_same_state_same_args_is_cached() {
        let calls = Rc::new(Cell::new(0));
        let selector = by_modulus(&calls);
        let root = root_with(&initial());

        let first = selector.select(&root, &[2]).unwrap();
        let second = selector.select(&root, &[2]).unwrap();

        assert_eq!(*first, vec![Item { id: 2, started: false }]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_changed_argument_recomputes() {
        let calls = Rc::new(Cell::new(0));
        let selector = by_modulus(&calls);
        let root = root_with(&initial());

        let by_two = selector.select(&root, &[2]).unwrap();
        let by_three = selector.select(&root, &[3]).unwrap();

        assert!(!Arc::ptr_eq(&by_two, &by_three));
        assert_eq!(*by_three, vec![Item { id: 3, started: false }]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_single_slot_cache_evicts_previous_args() {
        let calls = Rc::new(Cell::new(0));
        let selector = by_modulus(&calls);
        let root = root_with(&initial());

        let first = selector.select(&root, &[2]).unwrap();
        selector.select(&root, &[3]).unwrap();
        let again = selector.select(&root, &[2]).unwrap();

        // Only the latest call is remembered, so returning to 2 derives again
        assert_eq!(calls.get(), 3);
        assert_eq!(first, again);
        assert!(!Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_argument_count_change_recomputes() {
        let calls = Rc::new(Cell::new(0));
        let selector = by_modulus(&calls);
        let root = root_with(&initial());

        selector.select(&root, &[2]).unwrap();
        selector.select(&root, &[]).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_new_sub_state_reference_recomputes() {
        let calls = Rc::new(Cell::new(0));
        let selector = by_modulus(&calls);
        let state = initial();

        let first = selector.select(&root_with(&state), &[2]).unwrap();
        // Structurally identical, different allocation
        let copy = Arc::new((*state).clone());
        let second = selector.select(&root_with(&copy), &[2]).unwrap();

        assert_eq!(first, second);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_custom_equality_tolerates_equal_arguments() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let selector = MemoizedSelector::new(
            "items".to_string(),
            initial(),
            Box::new(move |state: &Items, args: &[String]| {
                counter.set(counter.get() + 1);
                state.items.len() + args.len()
            }),
            Box::new(|a: &String, b: &String| a.eq_ignore_ascii_case(b)),
        );
        let root = root_with(&initial());

        selector.select(&root, &["Name".to_string()]).unwrap();
        selector.select(&root, &["NAME".to_string()]).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_clear_forces_recompute() {
        let calls = Rc::new(Cell::new(0));
        let selector = by_modulus(&calls);
        let root = root_with(&initial());

        selector.select(&root, &[2]).unwrap();
        selector.clear();
        selector.select(&root, &[2]).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_absent_slice_uses_initial_state() {
        let calls = Rc::new(Cell::new(0));
        let selector = by_modulus(&calls);
        let root = RootState::new();

        let first = selector.select(&root, &[1]).unwrap();
        let second = selector.select(&root, &[1]).unwrap();
        assert_eq!(first.len(), 3);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
    }
}

//! Memoized resolution cells.
//!
//! Every derived property of a semantic node (a base type, a parameter type,
//! a navigation partner, ...) lives in a [`Memo`]. The first read runs the
//! compute function; every later read returns the cached value. A cell moves
//! through `Unevaluated → Evaluating → Evaluated` exactly once and is never
//! reset.
//!
//! The `Evaluating` state doubles as the cycle sentinel. If a compute
//! function (directly or through other cells) reads the cell it is currently
//! filling, [`Memo::get_or_cycle`] hands the re-entrant reader the value of
//! its `on_cycle` function instead of recursing. The outer evaluation is not
//! disturbed: it finishes and its own result is what gets cached.
//!
//! Cells use `Cell`/`OnceCell` and are therefore `!Sync`. A model and all its
//! cells belong to one thread; sharing across threads needs external
//! synchronization and is not supported.

use std::cell::{Cell, OnceCell};
use std::fmt;

/// Observable state of a [`Memo`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoState {
    Unevaluated,
    Evaluating,
    Evaluated,
}

/// A compute-once, cycle-aware cell.
pub struct Memo<T> {
    evaluating: Cell<bool>,
    value: OnceCell<T>,
}

impl<T> Memo<T> {
    pub const fn new() -> Self {
        Self {
            evaluating: Cell::new(false),
            value: OnceCell::new(),
        }
    }

    pub fn state(&self) -> MemoState {
        if self.value.get().is_some() {
            MemoState::Evaluated
        } else if self.evaluating.get() {
            MemoState::Evaluating
        } else {
            MemoState::Unevaluated
        }
    }

    pub fn is_evaluating(&self) -> bool {
        self.state() == MemoState::Evaluating
    }

    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }

    /// Peek at the cached value without computing it.
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Read the cell, computing it on first access.
    ///
    /// For properties that cannot legitimately be cyclic.
    ///
    /// # Panics
    ///
    /// Panics if `compute` re-enters this cell. That would mean a property
    /// without a cycle handler turned out to be self-referential, which is a
    /// modelling bug rather than bad input.
    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> &T {
        if let Some(value) = self.value.get() {
            return value;
        }
        if self.evaluating.get() {
            panic!("memoized property re-entered during its own evaluation without a cycle handler");
        }
        self.evaluating.set(true);
        let computed = compute();
        self.evaluating.set(false);
        self.value.get_or_init(|| computed)
    }
}

impl<T: Clone> Memo<T> {
    /// Read the cell, computing it on first access; re-entrant reads while
    /// the cell is evaluating receive `on_cycle()` instead.
    pub fn get_or_cycle(&self, compute: impl FnOnce() -> T, on_cycle: impl FnOnce() -> T) -> T {
        if let Some(value) = self.value.get() {
            return value.clone();
        }
        if self.evaluating.get() {
            return on_cycle();
        }
        self.get_or_compute(compute).clone()
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("Memo").field(value).finish(),
            None => f.debug_tuple("Memo").field(&self.state()).finish(),
        }
    }
}

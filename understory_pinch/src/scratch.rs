// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded reuse pool for transient buffers.

use alloc::vec::Vec;

use smallvec::SmallVec;

/// Default number of idle values a [`ScratchPool`] keeps around.
pub const DEFAULT_POOL_CAPACITY: usize = 16;

/// Values that can be cleared back to a freshly-created state.
pub trait Reset {
    /// Clears the value while keeping any allocation it owns.
    fn reset(&mut self);
}

impl<T> Reset for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// Reusable scratch values for per-event and per-frame work.
///
/// This is useful in tight loops (one gesture event or animation frame at a
/// time) to avoid allocating temporary buffers on every call. Values handed
/// out by [`ScratchPool::take`] are indistinguishable from fresh ones, so a
/// pool with capacity `0` behaves exactly like always allocating.
///
/// Matrices and rectangles are plain `Copy` values and never go through here.
#[derive(Debug)]
pub struct ScratchPool<T> {
    idle: SmallVec<[T; 4]>,
    capacity: usize,
}

impl<T: Default + Reset> ScratchPool<T> {
    /// Creates an empty pool that retains at most `capacity` idle values.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: SmallVec::new(),
            capacity,
        }
    }

    /// Takes an idle value, or creates a new one if the pool is empty.
    pub fn take(&mut self) -> T {
        match self.idle.pop() {
            Some(mut value) => {
                value.reset();
                value
            }
            None => T::default(),
        }
    }

    /// Returns a value to the pool.
    ///
    /// If the pool is already full the value is dropped.
    pub fn give(&mut self, value: T) {
        if self.idle.len() < self.capacity {
            self.idle.push(value);
        }
    }

    /// Number of idle values currently held.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Maximum number of idle values retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Default + Reset> Default for ScratchPool<T> {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

//! Windowed sample storage with precomputed running averages.

use serde::{Deserialize, Serialize};

/// Which view of a sample window a read should use.
///
/// Passed explicitly on every read instead of living in mutable
/// module-level state, so two consumers of the same buffer can disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleView {
    /// Smoothed values: each slot holds the running average of the window
    /// as it stood when that slot was written.
    #[default]
    Averaged,
    /// Unsmoothed values exactly as pushed.
    Raw,
}

/// Numeric types storable in an [`AveragingBuffer`].
///
/// Division uses the type's own semantics: integer samples truncate
/// rather than promoting to floating point.
pub trait Sample: Copy + PartialOrd {
    /// Additive identity; also the floor negative inputs clamp to.
    const ZERO: Self;

    /// `self + rhs`.
    fn add(self, rhs: Self) -> Self;

    /// `self - rhs`. Only ever called with `rhs` previously accumulated
    /// into `self`, so the difference stays in range.
    fn sub(self, rhs: Self) -> Self;

    /// Divide an accumulated sum by a window count.
    fn div_count(self, count: usize) -> Self;

    /// Lossy conversion for plotting coordinates.
    fn as_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($ty:ty),*) => {
        $(impl Sample for $ty {
            const ZERO: Self = 0 as $ty;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                self - rhs
            }

            #[inline]
            fn div_count(self, count: usize) -> Self {
                self / count as $ty
            }

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_sample!(f32, f64, i32, i64, u32, u64);

/// Fixed-length ring of numeric samples that stores, alongside each raw
/// sample, the running average of the window at the time it was pushed.
///
/// The length need not be a power of two; wraparound uses modulo.
#[derive(Debug, Clone)]
pub struct AveragingBuffer<T: Sample> {
    raw: Vec<T>,
    averaged: Vec<T>,
    sum: T,
    head: usize,
    count: usize,
}

impl<T: Sample> AveragingBuffer<T> {
    /// Create an empty window of `length` slots.
    #[must_use]
    pub fn new(length: usize) -> Self {
        assert!(length > 0, "averaging window must hold at least one slot");
        Self {
            raw: vec![T::ZERO; length],
            averaged: vec![T::ZERO; length],
            sum: T::ZERO,
            head: 0,
            count: 0,
        }
    }

    /// Push a sample, evicting the oldest one once the window is full.
    ///
    /// Negative inputs clamp to zero before accumulation. The averaged
    /// slot is written before the raw slot is overwritten; head-value
    /// reads depend on this ordering.
    pub fn push(&mut self, value: T) {
        let value = if value < T::ZERO { T::ZERO } else { value };
        if self.count == self.capacity() {
            self.sum = self.sum.sub(self.raw[self.head]);
        } else {
            self.count += 1;
        }
        self.sum = self.sum.add(value);
        self.averaged[self.head] = self.sum.div_count(self.count);
        self.raw[self.head] = value;
        self.head = (self.head + 1) % self.capacity();
    }

    /// Number of samples currently in the window.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Check whether no samples have been pushed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check whether the window has saturated.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Fixed window length.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.len()
    }

    /// Most recently written value, or zero for an empty window.
    #[must_use]
    pub fn head_value(&self, view: SampleView) -> T {
        if self.count == 0 {
            return T::ZERO;
        }
        let slot = (self.head + self.capacity() - 1) % self.capacity();
        self.slot_value(slot, view)
    }

    /// Oldest visible value, or zero for an empty window.
    #[must_use]
    pub fn tail_value(&self, view: SampleView) -> T {
        if self.count == 0 {
            return T::ZERO;
        }
        self.slot_value(self.tail(), view)
    }

    /// Iterate the window oldest to newest.
    pub fn values(&self, view: SampleView) -> impl Iterator<Item = T> + '_ {
        let tail = self.tail();
        (0..self.count).map(move |i| self.slot_value((tail + i) % self.capacity(), view))
    }

    fn tail(&self) -> usize {
        if self.is_full() {
            self.head
        } else {
            0
        }
    }

    fn slot_value(&self, slot: usize, view: SampleView) -> T {
        match view {
            SampleView::Averaged => self.averaged[slot],
            SampleView::Raw => self.raw[slot],
        }
    }
}

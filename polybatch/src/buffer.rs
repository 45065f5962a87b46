//! Growable CPU arrays for batching data
//!
//! Provides auto-growing arrays that double their capacity on overflow and
//! keep their allocation across frames. Every collection the batcher owns
//! (vertex store, polygon ledger, sort order, output vertices and indices)
//! is one of these.

/// Initial capacity in elements (64K)
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Growth factor when an array needs to expand (2x)
const GROWTH_FACTOR: usize = 2;

/// Auto-growing array for per-frame batching data
///
/// Capacity only ever grows: `reset()` drops the logical length to zero but
/// keeps the allocation, so a steady-state frame performs no allocations.
/// Growth allocates a new backing store of double the size and copies the
/// live elements over.
pub struct GrowableArray<T: Copy> {
    /// Backing storage (`data.len()` is the used length)
    data: Vec<T>,
    /// Current capacity in elements
    capacity: usize,
    /// Debug label
    label: &'static str,
}

impl<T: Copy> GrowableArray<T> {
    /// Create a new array with the given initial capacity (at least 1)
    pub fn new(label: &'static str, initial_capacity: usize) -> Self {
        let capacity = initial_capacity.max(1);
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            label,
        }
    }

    /// Ensure the array has room for `additional` more elements
    ///
    /// Doubles the capacity until the requirement fits. Returns true if the
    /// array grew. Existing contents are preserved.
    pub fn ensure_capacity(&mut self, additional: usize) -> bool {
        let required = self.data.len() + additional;
        if required <= self.capacity {
            return false;
        }

        // At least double, or enough for required
        let mut new_capacity = self.capacity * GROWTH_FACTOR;
        while new_capacity < required {
            new_capacity *= GROWTH_FACTOR;
        }

        self.grow_to(new_capacity);
        true
    }

    /// Grow the capacity to `new_capacity` elements
    ///
    /// Does nothing if the array is already at least that large.
    pub fn grow_to(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity {
            return;
        }

        tracing::debug!(
            "Growing array '{}': {} -> {} elements",
            self.label,
            self.capacity,
            new_capacity
        );

        let mut data = Vec::with_capacity(new_capacity);
        data.extend_from_slice(&self.data);
        self.data = data;
        self.capacity = new_capacity;
    }

    /// Append one element, growing if needed. Returns its index.
    pub fn push(&mut self, value: T) -> usize {
        self.ensure_capacity(1);
        let index = self.data.len();
        self.data.push(value);
        index
    }

    /// Append a slice, growing if needed. Returns the offset it was written at.
    pub fn extend_from_slice(&mut self, values: &[T]) -> usize {
        self.ensure_capacity(values.len());
        let offset = self.data.len();
        self.data.extend_from_slice(values);
        offset
    }

    /// Append every element of an exact-size iterator, growing once up front
    pub fn extend_exact<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        self.ensure_capacity(values.len());
        self.data.extend(values);
    }

    /// Reset the used length (capacity is retained)
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Number of elements in use
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if no elements are in use
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current capacity in elements
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get an element by index
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// Used elements as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Used elements as a mutable slice (for in-place sorting)
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Copy> std::fmt::Debug for GrowableArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowableArray")
            .field("label", &self.label)
            .field("len", &self.data.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

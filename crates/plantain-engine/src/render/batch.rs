use std::fmt;

use super::Vertex;

/// Starting physical capacity of every batch, in vertices.
pub const INITIAL_VERTEX_CAPACITY: usize = 1024;

/// Capacity growth could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityError {
    /// Total vertex count that was needed.
    pub requested: usize,
    /// Capacity at the time of the failure.
    pub capacity: usize,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot grow vertex batch from {} to {} vertices",
            self.capacity, self.requested
        )
    }
}

impl std::error::Error for CapacityError {}

/// Growable vertex accumulator.
///
/// `len()` is the logical count for the current frame; `capacity()` is the
/// physical size. It doubles on demand up to the maximum and never shrinks.
/// Growth keeps every vertex already written.
#[derive(Debug, Clone)]
pub struct VertexBatch {
    vertices: Vec<Vertex>,
    capacity: usize,
    max_capacity: usize,
}

impl Default for VertexBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexBatch {
    pub fn new() -> Self {
        Self::with_max_capacity(usize::MAX)
    }

    /// Batch that refuses to grow past `max_capacity` vertices.
    pub fn with_max_capacity(max_capacity: usize) -> Self {
        let capacity = INITIAL_VERTEX_CAPACITY.min(max_capacity);
        Self {
            vertices: Vec::with_capacity(capacity),
            capacity,
            max_capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Changes the growth limit. Vertices already recorded are kept.
    pub fn set_max_capacity(&mut self, max_capacity: usize) {
        self.max_capacity = max_capacity;
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Resets the logical count; capacity is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Makes room for `additional` more vertices.
    ///
    /// Returns `Ok(true)` when the capacity grew.
    pub fn ensure_capacity(&mut self, additional: usize) -> Result<bool, CapacityError> {
        let fail = |requested| CapacityError { requested, capacity: self.capacity };

        let needed = self
            .vertices
            .len()
            .checked_add(additional)
            .ok_or_else(|| fail(usize::MAX))?;
        if needed > self.max_capacity {
            return Err(fail(needed));
        }
        if needed <= self.capacity {
            return Ok(false);
        }

        let mut new_cap = self.capacity.max(1);
        while new_cap < needed {
            new_cap = new_cap.saturating_mul(2);
        }
        let new_cap = new_cap.min(self.max_capacity);

        self.vertices
            .try_reserve_exact(new_cap - self.vertices.len())
            .map_err(|_| fail(needed))?;

        log::debug!("vertex batch grown {} -> {new_cap}", self.capacity);
        self.capacity = new_cap;
        Ok(true)
    }

    /// Appends a whole draw unit, or nothing if capacity cannot be reserved.
    pub fn extend(&mut self, vertices: &[Vertex]) -> Result<(), CapacityError> {
        if vertices.is_empty() {
            return Ok(());
        }
        self.ensure_capacity(vertices.len())?;
        self.vertices.extend_from_slice(vertices);
        Ok(())
    }
}

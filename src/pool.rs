//! Generic object pool for projectiles.
//!
//! Instances are created up front (pre-warmed) or on demand and are only
//! destroyed when the pool itself is dropped. Each slot is either available or
//! in use, never both. `get` never fails: an exhausted pool grows, trading
//! memory for availability under burst fire.
//!
//! Handles carry a generation counter, so a handle kept after its instance was
//! returned can never reach the instance's next occupant. Returning twice is a
//! no-op.

use bevy::prelude::*;

/// Something that can live in an [`ObjectPool`].
pub trait Poolable: Default {
    /// Place a freshly checked-out instance.
    fn activate(&mut self, position: Vec2, direction: Vec2);

    /// Reset state when the instance goes back to the pool.
    fn reset(&mut self);
}

/// Stable reference to a pooled instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

impl PoolHandle {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Extra reset logic run after [`Poolable::reset`] on every return.
pub type ReturnHook<T> = Box<dyn FnMut(&mut T) + Send + Sync>;

/// Lifetime counters, mostly for tests and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub gets: u64,
    pub returns: u64,
    /// Instances allocated after construction because the pool ran dry
    pub grown: u64,
}

struct Slot<T> {
    item: T,
    generation: u32,
    in_use: bool,
}

/// Growable pool of reusable instances.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use neural_break_weapons::pool::ObjectPool;
/// use neural_break_weapons::projectile::Projectile;
///
/// let mut pool: ObjectPool<Projectile> = ObjectPool::new(4);
/// let handle = pool.get(Vec2::ZERO, Vec2::Y);
/// assert_eq!(pool.active_count(), 1);
/// assert!(pool.return_instance(handle));
/// assert!(!pool.return_instance(handle)); // second return is ignored
/// ```
pub struct ObjectPool<T: Poolable> {
    slots: Vec<Slot<T>>,
    available: Vec<u32>,
    on_return: Option<ReturnHook<T>>,
    stats: PoolStats,
}

impl<T: Poolable> ObjectPool<T> {
    /// Create a pool with `prewarm` instances ready to hand out.
    pub fn new(prewarm: usize) -> Self {
        let mut pool = Self {
            slots: Vec::with_capacity(prewarm),
            available: Vec::with_capacity(prewarm),
            on_return: None,
            stats: PoolStats::default(),
        };
        for _ in 0..prewarm {
            pool.push_slot();
        }
        // Hand out low indices first
        pool.available.reverse();
        pool
    }

    /// Register a hook invoked on every successful return.
    pub fn with_return_hook(mut self, hook: impl FnMut(&mut T) + Send + Sync + 'static) -> Self {
        self.on_return = Some(Box::new(hook));
        self
    }

    fn push_slot(&mut self) -> u32 {
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            item: T::default(),
            generation: 0,
            in_use: false,
        });
        self.available.push(index);
        index
    }

    /// Check out an instance placed at `position` facing `direction`.
    ///
    /// Grows the pool when nothing is available.
    pub fn get(&mut self, position: Vec2, direction: Vec2) -> PoolHandle {
        let index = match self.available.pop() {
            Some(index) => index,
            None => {
                self.push_slot();
                self.stats.grown += 1;
                debug!("object pool exhausted, grew to {} instances", self.slots.len());
                // push_slot made the new index the only available one
                self.available.pop().unwrap_or(self.slots.len() as u32 - 1)
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.in_use = true;
        slot.item.activate(position, direction);
        self.stats.gets += 1;

        PoolHandle {
            index,
            generation: slot.generation,
        }
    }

    /// Return an instance to the available set.
    ///
    /// Returns `false` (and does nothing) for stale handles and instances that
    /// are already available.
    pub fn return_instance(&mut self, handle: PoolHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index()) else {
            return false;
        };
        if !slot.in_use || slot.generation != handle.generation {
            return false;
        }

        slot.in_use = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.item.reset();
        if let Some(hook) = self.on_return.as_mut() {
            hook(&mut slot.item);
        }
        self.available.push(handle.index);
        self.stats.returns += 1;
        true
    }

    /// Return every in-use instance.
    pub fn return_all(&mut self) -> usize {
        let mut handles = Vec::new();
        self.active_handles(&mut handles);
        handles
            .into_iter()
            .filter(|&handle| self.return_instance(handle))
            .count()
    }

    pub fn get_ref(&self, handle: PoolHandle) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.in_use && slot.generation == handle.generation)
            .map(|slot| &slot.item)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.in_use && slot.generation == handle.generation)
            .map(|slot| &mut slot.item)
    }

    /// Whether the handle still refers to a checked-out instance.
    pub fn is_in_use(&self, handle: PoolHandle) -> bool {
        self.get_ref(handle).is_some()
    }

    /// Write handles of all in-use instances into `out` (cleared first).
    pub fn active_handles(&self, out: &mut Vec<PoolHandle>) {
        out.clear();
        out.extend(
            self.slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.in_use)
                .map(|(index, slot)| PoolHandle {
                    index: index as u32,
                    generation: slot.generation,
                }),
        );
    }

    /// Iterate in-use instances.
    pub fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|slot| slot.in_use).map(|slot| &slot.item)
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.available.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Total instances owned, in use or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<T: Poolable> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Default)]
struct FreeList {
    free: Vec<u32>,
    next: u32,
}

/// Dense ID allocator for program/render states.
///
/// IDs are small integers suitable for sort keys and batching tables. Released
/// IDs are reused last-in-first-out before the pool grows. The pool is shared
/// by cloning and is not thread-safe.
#[derive(Debug, Clone, Default)]
pub struct StateIdPool {
    inner: Rc<RefCell<FreeList>>,
}

impl StateIdPool {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the most recently released ID, or a new one.
    pub fn allocate(&self) -> StateId {
        let mut list = self.inner.borrow_mut();
        let value = match list.free.pop() {
            Some(value) => value,
            None => {
                let value = list.next;
                list.next += 1;
                value
            }
        };

        StateId {
            value,
            pool: Rc::clone(&self.inner),
        }
    }

    /// Number of IDs currently held by live states.
    pub fn live_count(&self) -> usize {
        let list = self.inner.borrow();
        list.next as usize - list.free.len()
    }

    /// One past the largest ID ever handed out; tables indexed by ID need this many slots.
    pub fn capacity(&self) -> u32 {
        self.inner.borrow().next
    }
}

/// An allocated state ID. Returned to its pool on drop.
pub struct StateId {
    value: u32,
    pool: Rc<RefCell<FreeList>>,
}

impl StateId {
    #[inline]
    pub fn get(&self) -> u32 {
        self.value
    }

    /// Returns the pool this ID was drawn from.
    pub fn pool(&self) -> StateIdPool {
        StateIdPool {
            inner: Rc::clone(&self.pool),
        }
    }
}

impl Drop for StateId {
    fn drop(&mut self) {
        self.pool.borrow_mut().free.push(self.value);
    }
}

impl PartialEq for StateId {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && Rc::ptr_eq(&self.pool, &other.pool)
    }
}

impl Eq for StateId {}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateId").field(&self.value).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_grow_densely_from_zero() {
        let pool = StateIdPool::new();
        let a = pool.allocate();
        let b = pool.allocate();
        let c = pool.allocate();
        assert_eq!((a.get(), b.get(), c.get()), (0, 1, 2));
        assert_eq!(pool.live_count(), 3);
    }

    #[test]
    fn released_ids_are_reused_before_growing() {
        let pool = StateIdPool::new();
        let a = pool.allocate();
        let b = pool.allocate();
        drop(a);
        let c = pool.allocate();
        assert_eq!(c.get(), 0);
        assert_eq!(pool.capacity(), 2);
        drop(b);
        drop(c);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn reuse_is_last_in_first_out() {
        let pool = StateIdPool::new();
        let ids: Vec<_> = (0..4).map(|_| pool.allocate()).collect();
        let mut ids = ids.into_iter();
        let (i0, i1, i2, i3) = (ids.next(), ids.next(), ids.next(), ids.next());
        drop(i1);
        drop(i3);
        assert_eq!(pool.allocate().get(), 3);
        drop(i0);
        drop(i2);
    }

    #[test]
    fn pool_outlives_handle_through_ids() {
        let id = StateIdPool::new().allocate();
        let pool = id.pool();
        drop(id);
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.allocate().get(), 0);
    }
}

//! Reference-counted pointer: an atomic intrusive refcount
//! with `add_ref`/`release`, `release` dropping the pointee at zero. Rust's
//! `Arc` is the non-intrusive equivalent of this idea;
//! [`RefCounted`] models the intrusive variant some stream/pool handles
//! actually want, where the count lives inside the allocation
//! itself rather than in a separate control block.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Inner<T> {
    count: AtomicUsize,
    value: T,
}

/// An intrusively refcounted handle to a `T`. Cloning bumps the shared
/// count; dropping the last handle frees the allocation. The destructor
/// never panics — there is nothing fallible in a `Box` deallocation.
pub struct RefCounted<T> {
    ptr: NonNull<Inner<T>>,
}

unsafe impl<T: Send + Sync> Send for RefCounted<T> {}
unsafe impl<T: Send + Sync> Sync for RefCounted<T> {}

impl<T> RefCounted<T> {
    pub fn new(value: T) -> Self {
        let boxed = Box::new(Inner {
            count: AtomicUsize::new(1),
            value,
        });
        RefCounted {
            ptr: NonNull::new(Box::into_raw(boxed)).expect("Box::into_raw is never null"),
        }
    }

    /// Number of live handles sharing this allocation.
    pub fn ref_count(&self) -> usize {
        unsafe { self.ptr.as_ref().count.load(Ordering::Acquire) }
    }

    fn add_ref(&self) {
        unsafe {
            self.ptr.as_ref().count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Drops one reference, freeing the pointee if it was the last one.
    /// Called automatically by `Drop`; exposed directly for callers that
    /// model explicit release points the way a manual
    /// `add_ref`/`release` pair would.
    pub fn release(self) {
        drop(self)
    }
}

impl<T> std::ops::Deref for RefCounted<T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &self.ptr.as_ref().value }
    }
}

impl<T> Clone for RefCounted<T> {
    fn clone(&self) -> Self {
        self.add_ref();
        RefCounted { ptr: self.ptr }
    }
}

impl<T> Drop for RefCounted<T> {
    fn drop(&mut self) {
        unsafe {
            if self.ptr.as_ref().count.fetch_sub(1, Ordering::Release) == 1 {
                std::sync::atomic::fence(Ordering::Acquire);
                drop(Box::from_raw(self.ptr.as_ptr()));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_clone_bumps_count_drop_decrements() {
        let a = RefCounted::new(42i32);
        assert_eq!(a.ref_count(), 1);
        let b = a.clone();
        assert_eq!(a.ref_count(), 2);
        assert_eq!(*b, 42);
        drop(b);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn test_last_drop_frees() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct Counted(Arc<AtomicUsize>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let a = RefCounted::new(Counted(drops.clone()));
        let b = a.clone();
        drop(a);
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        drop(b);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }
}

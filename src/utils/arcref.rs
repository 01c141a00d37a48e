use std::{cell::RefCell, sync::Arc};

#[cfg(debug_assertions)]
use std::time::{Duration, Instant};

/// Shared handle around `Arc<RefCell<T>>`, used to hand the same window state to
/// the runner, the window and the pixel buffer without spelling out the type.
///
/// Everything holding an [ArcRef] lives on the event loop thread.
pub struct ArcRef<T> {
    inner: Arc<RefCell<T>>,
}

impl<T> ArcRef<T> {
    pub fn new(value: T) -> ArcRef<T> {
        ArcRef {
            inner: Arc::new(RefCell::new(value)),
        }
    }

    /// Spin until an immutable borrow is available.
    ///
    /// NOTE: In debug mode, this will panic after waiting for more than 5 seconds.
    pub fn wait_borrow(&self) -> std::cell::Ref<'_, T> {
        #[cfg(debug_assertions)]
        let start = Instant::now();

        loop {
            if let Ok(borrow) = self.inner.try_borrow() {
                return borrow;
            }

            #[cfg(debug_assertions)]
            if start.elapsed() > Duration::from_secs(5) {
                panic!("wait_borrow: waited more than 5 seconds to acquire immutable borrow");
            }
        }
    }

    /// Spin until a mutable borrow is available.
    ///
    /// NOTE: In debug mode, this will panic after waiting for more than 5 seconds.
    pub fn wait_borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        #[cfg(debug_assertions)]
        let start = Instant::now();

        loop {
            if let Ok(borrow) = self.inner.try_borrow_mut() {
                return borrow;
            }

            #[cfg(debug_assertions)]
            if start.elapsed() > Duration::from_secs(5) {
                panic!("wait_borrow_mut: waited more than 5 seconds to acquire mutable borrow");
            }
        }
    }

    /// Will panic if the value is already borrowed mutably.
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.inner.borrow()
    }

    /// Will panic if the value is already borrowed.
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    pub fn try_borrow_mut(&self) -> Option<std::cell::RefMut<'_, T>> {
        self.inner.try_borrow_mut().ok()
    }
}

impl<T> Clone for ArcRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> PartialEq for ArcRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for ArcRef<T> {}

impl<T: std::fmt::Debug> std::fmt::Debug for ArcRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_borrow() {
            Ok(value) => f.debug_tuple("ArcRef").field(&*value).finish(),
            Err(_) => f.write_str("ArcRef(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ArcRef;

    #[test]
    fn clones_share_the_same_cell() {
        let a = ArcRef::new(1u32);
        let b = a.clone();

        *b.borrow_mut() += 41;

        assert_eq!(*a.wait_borrow(), 42);
        assert_eq!(a, b);
        assert_ne!(a, ArcRef::new(42u32));
    }

    #[test]
    fn try_borrow_mut_fails_while_borrowed() {
        let a = ArcRef::new(Vec::<u8>::new());
        let guard = a.borrow();

        assert!(a.try_borrow_mut().is_none());
        drop(guard);
        assert!(a.try_borrow_mut().is_some());
    }
}

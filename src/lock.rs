/// Lock guarding mutable mock state.
///
/// Uses `std::sync::Mutex` with the `std` feature, `spin::Mutex` with `spin-lock`,
/// and a plain `RefCell` otherwise (in which case the owner is `!Sync`).
pub(crate) struct MutexIsh<T> {
    #[cfg(feature = "std")]
    inner: ::std::sync::Mutex<T>,

    #[cfg(all(feature = "spin-lock", not(feature = "std")))]
    inner: ::spin::Mutex<T>,

    #[cfg(not(any(feature = "std", feature = "spin-lock")))]
    inner: core::cell::RefCell<T>,
}

#[cfg(feature = "std")]
impl<T> MutexIsh<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: ::std::sync::Mutex::new(value),
        }
    }

    pub fn locked<U>(&self, func: impl FnOnce(&mut T) -> U) -> U {
        // A panicking test thread must not poison the records for the verifying thread.
        let mut lock = match self.inner.lock() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        func(&mut *lock)
    }
}

#[cfg(all(feature = "spin-lock", not(feature = "std")))]
impl<T> MutexIsh<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: ::spin::Mutex::new(value),
        }
    }

    pub fn locked<U>(&self, func: impl FnOnce(&mut T) -> U) -> U {
        let mut lock = self.inner.lock();
        func(&mut *lock)
    }
}

#[cfg(not(any(feature = "std", feature = "spin-lock")))]
impl<T> MutexIsh<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: core::cell::RefCell::new(value),
        }
    }

    pub fn locked<U>(&self, func: impl FnOnce(&mut T) -> U) -> U {
        func(&mut self.inner.borrow_mut())
    }
}

impl<T: Default> Default for MutexIsh<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

//! Lazily computed in-memory slots

use crate::error::SdpResult;

/// A value computed on first access and kept until invalidated
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: Option<T>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> Cached<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value, running `factory` only when the slot is empty
    pub fn get_or_try_init<F>(&mut self, factory: F) -> SdpResult<&mut T>
    where
        F: FnOnce() -> SdpResult<T>,
    {
        let value = match self.value.take() {
            Some(value) => value,
            None => factory()?,
        };
        Ok(self.value.insert(value))
    }

    pub fn get_or_init<F>(&mut self, factory: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.value.get_or_insert_with(factory)
    }

    /// Drop the cached value. Returns true when there was one.
    pub fn invalidate(&mut self) -> bool {
        self.value.take().is_some()
    }

    pub fn is_fresh(&self) -> bool {
        self.value.is_some()
    }

    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

/// A cached value that survives invalidation as an "outdated" copy
///
/// The outdated copy is the recycling candidate for the next build. Only
/// the latest current value is retained; an older outdated copy is
/// replaced.
#[derive(Debug, Clone)]
pub struct RetainingCache<T> {
    current: Option<T>,
    outdated: Option<T>,
}

impl<T> Default for RetainingCache<T> {
    fn default() -> Self {
        Self {
            current: None,
            outdated: None,
        }
    }
}

impl<T> RetainingCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the current value to the outdated slot
    pub fn invalidate(&mut self) -> bool {
        match self.current.take() {
            Some(value) => {
                self.outdated = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.current.is_some()
    }

    pub fn has_outdated(&self) -> bool {
        self.outdated.is_some()
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.current.as_mut()
    }

    pub fn take_current(&mut self) -> Option<T> {
        self.current.take()
    }

    /// Consume the outdated copy
    pub fn take_outdated(&mut self) -> Option<T> {
        self.outdated.take()
    }

    /// Make `value` current
    pub fn install(&mut self, value: T) -> &mut T {
        self.current.insert(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdpError;
    use std::cell::Cell;

    #[test]
    fn factory_runs_once() {
        let calls = Cell::new(0);
        let mut slot = Cached::new();
        for _ in 0..3 {
            let value = slot
                .get_or_try_init(|| {
                    calls.set(calls.get() + 1);
                    Ok(7)
                })
                .unwrap();
            assert_eq!(*value, 7);
        }
        assert_eq!(calls.get(), 1);

        assert!(slot.invalidate());
        slot.get_or_init(|| 8);
        assert_eq!(slot.peek(), Some(&8));
    }

    #[test]
    fn failed_factory_leaves_slot_empty() {
        let mut slot: Cached<u32> = Cached::new();
        let err = slot.get_or_try_init(|| Err(SdpError::User("boom".to_string())));
        assert!(err.is_err());
        assert!(!slot.is_fresh());
    }

    #[test]
    fn invalidation_retains_outdated() {
        let mut slot = RetainingCache::new();
        assert!(!slot.invalidate());
        assert!(!slot.has_outdated());

        slot.install("first");
        assert!(slot.invalidate());
        assert!(!slot.is_fresh());
        assert_eq!(slot.take_outdated(), Some("first"));
        assert_eq!(slot.take_outdated(), None);
    }

    #[test]
    fn empty_invalidation_keeps_previous_outdated() {
        let mut slot = RetainingCache::new();
        slot.install(1);
        slot.invalidate();
        slot.invalidate();
        assert_eq!(slot.take_outdated(), Some(1));
    }
}

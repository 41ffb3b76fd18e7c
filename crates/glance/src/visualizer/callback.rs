//! The animation-callback slot.

use std::cell::RefCell;
use std::rc::Rc;

/// A callback invoked once per loop iteration. Returning true requests a
/// redraw.
pub type AnimationCallback<T> = Rc<RefCell<dyn FnMut(&mut T) -> bool>>;

/// Holds the registered callback.
///
/// Registration writes the pending slot. Each loop iteration takes a
/// [`snapshot`](Self::snapshot) first and invokes only that, so a callback
/// replacing itself keeps running to the end of its own invocation and the
/// replacement starts with the next iteration.
pub(crate) struct CallbackSlot<T> {
    pending: Option<AnimationCallback<T>>,
}

impl<T> CallbackSlot<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn register(&mut self, callback: impl FnMut(&mut T) -> bool + 'static) {
        self.pending = Some(Rc::new(RefCell::new(callback)));
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn is_registered(&self) -> bool {
        self.pending.is_some()
    }

    pub fn snapshot(&self) -> Option<AnimationCallback<T>> {
        self.pending.clone()
    }
}

/// Invokes a snapshot taken with [`CallbackSlot::snapshot`].
///
/// Returns `None` when the callback is already executing further up the
/// stack, which happens if it pumps the event loop itself.
pub(crate) fn invoke<T>(callback: &AnimationCallback<T>, target: &mut T) -> Option<bool> {
    let Ok(mut callback) = callback.try_borrow_mut() else {
        log::debug!("animation callback re-entered, skipping nested invocation");
        return None;
    };
    Some(callback(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_survives_replacement() {
        let mut slot: CallbackSlot<Vec<&'static str>> = CallbackSlot::new();
        slot.register(|log| {
            log.push("first");
            true
        });
        let active = slot.snapshot().unwrap();
        slot.register(|log| {
            log.push("second");
            false
        });

        let mut log = Vec::new();
        assert_eq!(invoke(&active, &mut log), Some(true));
        assert_eq!(invoke(&slot.snapshot().unwrap(), &mut log), Some(false));
        assert_eq!(log, vec!["first", "second"]);
    }

    #[test]
    fn test_nested_invocation_is_skipped() {
        let mut slot: CallbackSlot<u32> = CallbackSlot::new();
        slot.register(|n| {
            *n += 1;
            true
        });
        let active = slot.snapshot().unwrap();
        let _held = active.borrow_mut();
        assert_eq!(invoke(&active, &mut 0), None);
    }

    #[test]
    fn test_clear() {
        let mut slot: CallbackSlot<u32> = CallbackSlot::new();
        slot.register(|_| false);
        assert!(slot.is_registered());
        slot.clear();
        assert!(slot.snapshot().is_none());
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use crate::{remember, remember_with_key};

#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    pub fn noop() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }
}

/// Holds a cleanup for as long as its composition slot is mounted.
struct Mounted(Dispose);

impl Drop for Mounted {
    fn drop(&mut self) {
        self.0.run();
    }
}

/// Runs `f` once when the calling component mounts. The returned `Dispose`
/// runs when the component unmounts.
pub fn effect<F>(f: F)
where
    F: FnOnce() -> Dispose + 'static,
{
    let _ = remember(|| Mounted(f()));
}

/// Helper to register cleanup inside effect.
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

/// Cleanup on key change or unmount.
pub fn disposable_effect<K: PartialEq + Clone + 'static>(
    callsite: &str,
    key: K,
    effect: impl FnOnce() -> Dispose + 'static,
) {
    let slot = remember_with_key(format!("effect:{callsite}"), || {
        RefCell::new((None::<K>, None::<Mounted>))
    });

    let changed = slot.borrow().0.as_ref() != Some(&key);
    if changed {
        let previous = {
            let mut s = slot.borrow_mut();
            s.0 = Some(key);
            s.1.take()
        };
        // cleanup of the previous run before the new one starts
        drop(previous);
        let d = effect();
        slot.borrow_mut().1 = Some(Mounted(d));
    }
}

//! Loading boundaries.
//!
//! A component whose data is not ready calls `suspend` with the pending
//! `Completion`. The nearest enclosing `Suspense` shows its fallback until
//! every completion registered during its pass has settled; each settle
//! requests a frame, so the read is simply retried by the next pass.

use std::cell::RefCell;

use bulwark_core::*;
use smallvec::SmallVec;

type Pending = SmallVec<[Completion; 2]>;

thread_local! {
    static SUSPENSE_STACK: RefCell<Vec<Pending>> = const { RefCell::new(Vec::new()) };
}

/// Registers `completion` with the nearest `Suspense` and returns a placeholder.
pub fn suspend(completion: Completion) -> View {
    let registered = SUSPENSE_STACK.with(|st| match st.borrow_mut().last_mut() {
        Some(top) => {
            if !top.iter().any(|c| c.ptr_eq(&completion)) {
                top.push(completion);
            }
            true
        }
        None => false,
    });
    if !registered {
        log::warn!("suspend() called outside of a Suspense boundary; rendering a placeholder");
    }
    View::new(0, ViewKind::Suspended)
}

/// Shows `fallback` while anything composed by `content` is suspended.
///
/// Failures from `content` pass through untouched to the enclosing boundary.
pub fn Suspense<R: IntoRendered>(
    fallback: impl FnOnce() -> View,
    content: impl FnOnce() -> R,
) -> Result<View, RenderError> {
    struct StackGuard;
    impl Drop for StackGuard {
        fn drop(&mut self) {
            if std::thread::panicking() {
                let _ = SUSPENSE_STACK.try_with(|st| st.borrow_mut().pop());
            }
        }
    }

    SUSPENSE_STACK.with(|st| st.borrow_mut().push(Pending::new()));
    let guard = StackGuard;
    let rendered = content().into_rendered();
    let pending = SUSPENSE_STACK.with(|st| st.borrow_mut().pop()).unwrap_or_default();
    std::mem::forget(guard);

    let view = rendered?;
    let waiting = pending.iter().filter(|c| !c.is_settled()).count();
    if waiting > 0 {
        log::trace!("suspense: waiting on {waiting} completion(s)");
        Ok(fallback())
    } else {
        Ok(view)
    }
}

/// Reads `resource`, suspending the nearest `Suspense` while it is pending.
/// `Ok(None)` means the caller should render nothing real yet.
pub fn read_resource<T: Clone + 'static>(
    resource: &DeferredResource<T>,
) -> Result<Option<T>, RenderError> {
    match resource.read() {
        Read::Ready(v) => Ok(Some(v)),
        Read::Pending(completion) => {
            suspend(completion);
            Ok(None)
        }
        Read::Failed(e) => Err(e.into()),
    }
}

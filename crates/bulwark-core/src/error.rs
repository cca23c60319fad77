//! Failure taxonomy and the component path used to locate failures.

use std::any::Any;
use std::cell::RefCell;
use std::sync::Once;

use web_time::Duration;

use crate::View;

/// Terminal failure of a deferred resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("{message}")]
    Rejected { message: String },
    #[error("timed out after {after:?}")]
    TimedOut { after: Duration },
}

impl ResourceError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ResourceError::Rejected {
            message: message.into(),
        }
    }
}

/// A failure raised while composing a subtree.
///
/// `Display` is the bare message, which is what boundaries record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// Returned or raised explicitly by a component.
    #[error("{message}")]
    Raised { message: String },
    /// A panic caught during composition.
    #[error("{message}")]
    Panicked { message: String },
    /// A failed resource surfaced by a read.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        RenderError::Raised {
            message: message.into(),
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Converts a `catch_unwind` payload into a failure.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<RenderError>() {
            Ok(err) => return *err,
            Err(p) => p,
        };
        let message = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "Unknown panic".to_string()
        };
        RenderError::Panicked { message }
    }
}

/// Fails the current render pass from arbitrarily deep code.
pub fn raise(message: impl Into<String>) -> ! {
    std::panic::panic_any(RenderError::new(message))
}

/// Keeps failures thrown with `raise` out of the process panic hook; the
/// boundary that catches one logs it instead. Other panics reach whatever
/// hook was installed before. Runs once per process.
pub fn install_panic_hook() {
    static INSTALLED: Once = Once::new();
    INSTALLED.call_once(silence_raised_failures);
}

pub(crate) fn silence_raised_failures() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if info.payload().is::<RenderError>() {
            return;
        }
        previous(info);
    }));
}

/// What a component may return: a view, or a failure for the nearest boundary.
pub trait IntoRendered {
    fn into_rendered(self) -> Result<View, RenderError>;
    fn failure(&self) -> Option<&RenderError>;
}

impl IntoRendered for View {
    fn into_rendered(self) -> Result<View, RenderError> {
        Ok(self)
    }
    fn failure(&self) -> Option<&RenderError> {
        None
    }
}

impl IntoRendered for Result<View, RenderError> {
    fn into_rendered(self) -> Result<View, RenderError> {
        self
    }
    fn failure(&self) -> Option<&RenderError> {
        self.as_ref().err()
    }
}

/// Where a failure happened. `failure` is `None` for a panic, whose payload
/// is not visible while unwinding.
struct Origin {
    path: String,
    failure: Option<RenderError>,
}

thread_local! {
    static COMPONENT_PATH: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    static FAILURE_ORIGIN: RefCell<Option<Origin>> = const { RefCell::new(None) };
}

fn current_component_path() -> String {
    COMPONENT_PATH.with(|p| p.borrow().join(" > "))
}

// The innermost component sees a failure first; outer ones it propagates
// through keep its path. A different failure replaces an entry left behind by
// one a caller handled.
fn record_origin(failure: Option<&RenderError>) {
    let path = current_component_path();
    let _ = FAILURE_ORIGIN.try_with(|o| {
        let mut o = o.borrow_mut();
        let same = match (o.as_ref(), failure) {
            (Some(prev), Some(err)) => prev.failure.as_ref() == Some(err),
            (Some(prev), None) => prev.failure.is_none(),
            (None, _) => false,
        };
        if !same {
            *o = Some(Origin {
                path,
                failure: failure.cloned(),
            });
        }
    });
}

/// Composes `f` as a named component, so failures inside it report where
/// they happened.
pub fn component<R: IntoRendered>(name: &str, f: impl FnOnce() -> R) -> R {
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            if std::thread::panicking() {
                record_origin(None);
            }
            let _ = COMPONENT_PATH.try_with(|p| p.borrow_mut().pop());
        }
    }
    COMPONENT_PATH.with(|p| p.borrow_mut().push(name.to_string()));
    let _guard = Guard;
    let out = f();
    if let Some(err) = out.failure() {
        record_origin(Some(err));
    }
    out
}

/// Forgets any origin recorded by an earlier failure.
pub fn clear_failure_origin() {
    FAILURE_ORIGIN.with(|o| o.borrow_mut().take());
}

/// Component path where `failure` happened, if a component recorded it.
/// An origin left by a different, already handled failure is discarded.
pub fn take_failure_origin(failure: &RenderError) -> Option<String> {
    let origin = FAILURE_ORIGIN.with(|o| o.borrow_mut().take())?;
    match &origin.failure {
        Some(recorded) if recorded != failure => None,
        _ => Some(origin.path),
    }
}

//! Deferred resources: async work exposed as a synchronously readable handle.
//!
//! A resource starts its producer eagerly on creation and settles exactly
//! once. Reads never block; a pending read returns the `Completion` that the
//! host's suspension mechanism waits on.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures_util::future::{self, AbortHandle, Abortable, Either, FutureExt, LocalBoxFuture, Shared};
use web_time::Duration;

use crate::executor::{sleep, spawn};
use crate::{ResourceError, request_frame};

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceStatus<T> {
    Pending,
    Resolved(T),
    Failed(ResourceError),
}

impl<T> ResourceStatus<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, ResourceStatus::Pending)
    }
}

/// Result of a non-blocking read.
#[derive(Debug)]
pub enum Read<T> {
    Ready(T),
    Pending(Completion),
    Failed(ResourceError),
}

/// Awaitable that resolves once, when its resource leaves `Pending`.
///
/// Settling aborts a never-ending future; every clone shares it through
/// `Shared`, so one abort wakes all waiting tasks.
#[derive(Clone)]
pub struct Completion {
    handle: AbortHandle,
    signal: Shared<LocalBoxFuture<'static, ()>>,
}

impl Default for Completion {
    fn default() -> Self {
        let (handle, registration) = AbortHandle::new_pair();
        let signal = Abortable::new(future::pending::<()>(), registration)
            .map(|_| ())
            .boxed_local()
            .shared();
        Self { handle, signal }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    fn settled() -> Self {
        let completion = Self::new();
        completion.handle.abort();
        completion
    }

    pub fn is_settled(&self) -> bool {
        self.handle.is_aborted()
    }

    pub fn ptr_eq(&self, other: &Completion) -> bool {
        self.signal.ptr_eq(&other.signal)
    }

    fn settle(&self) {
        if self.is_settled() {
            return;
        }
        self.handle.abort();
        // suspended readers are retried by the next pass
        request_frame();
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        // a clone may already have observed the settle; `Shared` must not be
        // polled again once it returned `Ready`
        if self.is_settled() {
            return Poll::Ready(());
        }
        self.signal.poll_unpin(cx)
    }
}

struct ResourceInner<T> {
    status: RefCell<ResourceStatus<T>>,
    completion: Completion,
}

impl<T> ResourceInner<T> {
    /// First outcome wins; later ones are ignored.
    fn settle(&self, outcome: Result<T, ResourceError>) -> bool {
        {
            let mut status = self.status.borrow_mut();
            if !status.is_pending() {
                log::warn!("deferred resource settled twice; keeping the first outcome");
                return false;
            }
            *status = match outcome {
                Ok(v) => ResourceStatus::Resolved(v),
                Err(e) => {
                    log::debug!("deferred resource failed: {e}");
                    ResourceStatus::Failed(e)
                }
            };
        }
        self.completion.settle();
        true
    }
}

/// Handle to one unit of asynchronous work. Clones share the same status, so
/// every reader observes the same single resolution.
pub struct DeferredResource<T: 'static> {
    inner: Rc<ResourceInner<T>>,
}

impl<T> Clone for DeferredResource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> DeferredResource<T> {
    /// Invokes `producer` immediately and spawns the future it returns.
    /// There is no way to cancel it; it runs until it settles.
    pub fn create<F, Fut>(producer: F) -> Self
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ResourceError>> + 'static,
    {
        let inner = Rc::new(ResourceInner {
            status: RefCell::new(ResourceStatus::Pending),
            completion: Completion::new(),
        });
        let work = producer();
        let target = inner.clone();
        spawn(async move {
            let outcome = work.await;
            target.settle(outcome);
        });
        Self { inner }
    }

    pub fn resolved(value: T) -> Self {
        Self {
            inner: Rc::new(ResourceInner {
                status: RefCell::new(ResourceStatus::Resolved(value)),
                completion: Completion::settled(),
            }),
        }
    }

    pub fn rejected(error: ResourceError) -> Self {
        Self {
            inner: Rc::new(ResourceInner {
                status: RefCell::new(ResourceStatus::Failed(error)),
                completion: Completion::settled(),
            }),
        }
    }

    pub fn is_settled(&self) -> bool {
        !self.inner.status.borrow().is_pending()
    }

    pub fn completion(&self) -> Completion {
        self.inner.completion.clone()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[cfg(test)]
    pub(crate) fn settle_for_test(&self, outcome: Result<T, ResourceError>) -> bool {
        self.inner.settle(outcome)
    }
}

impl<T: Clone + 'static> DeferredResource<T> {
    pub fn read(&self) -> Read<T> {
        match &*self.inner.status.borrow() {
            ResourceStatus::Pending => Read::Pending(self.inner.completion.clone()),
            ResourceStatus::Resolved(v) => Read::Ready(v.clone()),
            ResourceStatus::Failed(e) => Read::Failed(e.clone()),
        }
    }

    pub fn status(&self) -> ResourceStatus<T> {
        self.inner.status.borrow().clone()
    }
}

/// Races `work` against a timer started now; the timer winning fails with
/// `ResourceError::TimedOut`.
pub fn with_timeout<'a, T, F>(
    work: F,
    after: Duration,
) -> impl Future<Output = Result<T, ResourceError>> + 'a
where
    T: 'a,
    F: Future<Output = Result<T, ResourceError>> + 'a,
{
    let timer = sleep(after);
    future::select(work.boxed_local(), timer).map(move |winner| match winner {
        Either::Left((outcome, _)) => outcome,
        Either::Right(((), _)) => Err(ResourceError::TimedOut { after }),
    })
}

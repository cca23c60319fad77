//! Components whose code is loaded on first render.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use bulwark_core::*;
use futures_util::future::{FutureExt, LocalBoxFuture};

use crate::suspense::suspend;

pub type ComponentFn = Rc<dyn Fn() -> View>;

type Loader = std::boxed::Box<dyn FnOnce() -> LocalBoxFuture<'static, Result<ComponentFn, ResourceError>>>;

struct LazyInner {
    loader: RefCell<Option<Loader>>,
    resource: RefCell<Option<DeferredResource<ComponentFn>>>,
}

/// A component that starts loading the first time it is rendered, suspends
/// until loaded, and is cached from then on.
#[derive(Clone)]
pub struct Lazy {
    inner: Rc<LazyInner>,
}

impl Lazy {
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<ComponentFn, ResourceError>> + 'static,
    {
        let loader: Loader = std::boxed::Box::new(move || loader().boxed_local());
        Self {
            inner: Rc::new(LazyInner {
                loader: RefCell::new(Some(loader)),
                resource: RefCell::new(None),
            }),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner
            .resource
            .borrow()
            .as_ref()
            .is_some_and(|r| matches!(r.status(), ResourceStatus::Resolved(_)))
    }

    pub fn is_started(&self) -> bool {
        self.inner.resource.borrow().is_some()
    }

    fn resource(&self) -> DeferredResource<ComponentFn> {
        if let Some(r) = self.inner.resource.borrow().as_ref() {
            return r.clone();
        }
        let loader = self.inner.loader.borrow_mut().take();
        let resource = match loader {
            Some(load) => {
                log::debug!("lazy component: loading");
                DeferredResource::create(load)
            }
            None => DeferredResource::rejected(ResourceError::rejected("lazy loader missing")),
        };
        *self.inner.resource.borrow_mut() = Some(resource.clone());
        resource
    }

    pub fn render(&self) -> Result<View, RenderError> {
        match self.resource().read() {
            Read::Ready(component) => Ok(component()),
            Read::Pending(completion) => Ok(suspend(completion)),
            Read::Failed(e) => Err(e.into()),
        }
    }
}

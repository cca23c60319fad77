//! Error boundaries: supervise a subtree and swap it for fallback UI when
//! composing it fails.
//!
//! A boundary intercepts failures raised synchronously while its content is
//! composed: an `Err` returned by the content, or a panic unwinding out of it.
//! Failures in callbacks, timers or spawned tasks are not intercepted; those
//! must be handled where they happen. A failure raised by the fallback itself
//! escalates to the next enclosing boundary.
//!
//! ```rust,ignore
//! ErrorBoundary::new("profile", || UserProfile(&resource))
//!     .on_failure(log.sink())
//!     .reset_keys([ResetKey::from(user_id)])
//!     .render()
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::hash::Hash;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use bulwark_core::error::{clear_failure_origin, take_failure_origin};
use bulwark_core::*;
use smallvec::SmallVec;

use crate::{Button, Column, Text, ViewExt};

/// One element of a boundary's reset key list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResetKey {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for ResetKey {
    fn from(v: &str) -> Self {
        ResetKey::Str(v.to_string())
    }
}

impl From<String> for ResetKey {
    fn from(v: String) -> Self {
        ResetKey::Str(v)
    }
}

impl From<i64> for ResetKey {
    fn from(v: i64) -> Self {
        ResetKey::Int(v)
    }
}

impl From<i32> for ResetKey {
    fn from(v: i32) -> Self {
        ResetKey::Int(v.into())
    }
}

impl From<u32> for ResetKey {
    fn from(v: u32) -> Self {
        ResetKey::Int(v.into())
    }
}

impl From<bool> for ResetKey {
    fn from(v: bool) -> Self {
        ResetKey::Bool(v)
    }
}

pub type ResetKeys = SmallVec<[ResetKey; 4]>;

/// What a failed boundary shows instead of its content.
#[derive(Clone)]
pub enum Fallback {
    Static(View),
    Render(Rc<dyn Fn(&FailureRecord, ResetHandle) -> View>),
}

impl Fallback {
    pub fn render(f: impl Fn(&FailureRecord, ResetHandle) -> View + 'static) -> Self {
        Fallback::Render(Rc::new(f))
    }

    fn view(&self, record: &FailureRecord, reset: ResetHandle) -> View {
        match self {
            Fallback::Static(v) => v.clone(),
            Fallback::Render(f) => f(record, reset),
        }
    }
}

/// The built-in message-and-retry panel.
pub fn DefaultFallback(record: &FailureRecord, reset: ResetHandle) -> View {
    let details = config().show_failure_details.then(|| {
        Column().child((
            Text(format!("Error: {}", record.message)),
            Text(format!("Component: {}", record.origin)),
        ))
    });
    Column().child((
        Text("Something went wrong"),
        Text("An error occurred while rendering this component."),
        Button("Try Again", move || reset.reset()),
        details,
    ))
}

struct BoundaryState {
    name: String,
    // Present exactly while the boundary is failed.
    failure: Option<FailureRecord>,
    reset_token: u64,
    failures_captured: u64,
    prev_reset_keys: Option<ResetKeys>,
    prev_props: Option<u64>,
    pending_reset: Option<PostHandle>,
}

impl BoundaryState {
    fn new(name: String) -> Self {
        Self {
            name,
            failure: None,
            reset_token: 0,
            failures_captured: 0,
            prev_reset_keys: None,
            prev_props: None,
            pending_reset: None,
        }
    }

    fn schedule_reset(state: &Rc<RefCell<BoundaryState>>) {
        let weak = Rc::downgrade(state);
        let mut s = state.borrow_mut();
        if let Some(previous) = s.pending_reset.take() {
            previous.cancel();
        }
        log::debug!("{}: reset scheduled", s.name);
        s.pending_reset = Some(post(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().apply_reset();
            }
        }));
    }

    fn apply_reset(&mut self) {
        self.pending_reset = None;
        self.failure = None;
        self.reset_token += 1;
        log::info!("{}: reset, remounting content (token {})", self.name, self.reset_token);
        request_frame();
    }

    fn snapshot(&self) -> BoundarySnapshot {
        BoundarySnapshot {
            has_failure: self.failure.is_some(),
            failure: self.failure.clone(),
            reset_token: self.reset_token,
            failures_captured: self.failures_captured,
            reset_pending: self.pending_reset.is_some(),
        }
    }
}

impl Drop for BoundaryState {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_reset.take() {
            log::debug!("{}: unmounted with a pending reset; cancelled", self.name);
            pending.cancel();
        }
    }
}

/// Point-in-time view of a boundary's state.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundarySnapshot {
    pub has_failure: bool,
    pub failure: Option<FailureRecord>,
    pub reset_token: u64,
    pub failures_captured: u64,
    pub reset_pending: bool,
}

/// Schedules a reset of the boundary it came from. Does nothing once that
/// boundary has unmounted.
#[derive(Clone)]
pub struct ResetHandle {
    state: Weak<RefCell<BoundaryState>>,
}

impl ResetHandle {
    /// Clears the failure at the next scheduling opportunity and remounts the
    /// content from scratch. A second call before then replaces the first.
    pub fn reset(&self) {
        if let Some(state) = self.state.upgrade() {
            BoundaryState::schedule_reset(&state);
        }
    }
}

pub struct ErrorBoundary<'a> {
    key: String,
    name: String,
    content: Option<std::boxed::Box<dyn FnOnce() -> Result<View, RenderError> + 'a>>,
    fallback: Option<Fallback>,
    on_failure: Option<Rc<dyn Fn(&FailureRecord)>>,
    reset_keys: Option<ResetKeys>,
    reset_on_props_change: bool,
    props: Option<u64>,
    context: BTreeMap<String, String>,
}

impl<'a> ErrorBoundary<'a> {
    /// `key` identifies this boundary's state among its siblings.
    pub fn new<R: IntoRendered>(key: impl Into<String>, content: impl FnOnce() -> R + 'a) -> Self {
        let key = key.into();
        Self {
            name: format!("ErrorBoundary({key})"),
            key,
            content: Some(std::boxed::Box::new(move || content().into_rendered())),
            fallback: None,
            on_failure: None,
            reset_keys: None,
            reset_on_props_change: false,
            props: None,
            context: BTreeMap::new(),
        }
    }

    /// Origin reported when the failure happened outside any named component.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Called once per captured failure. A panic inside it is logged and
    /// swallowed.
    pub fn on_failure(mut self, f: impl Fn(&FailureRecord) + 'static) -> Self {
        self.on_failure = Some(Rc::new(f));
        self
    }

    /// While failed, any element differing from the previous pass resets the
    /// boundary.
    pub fn reset_keys<K: Into<ResetKey>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.reset_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// While failed, a change in this boundary's props resets it. Props are
    /// the context tags, reset keys, name and the value given to `props`.
    pub fn reset_on_props_change(mut self, enabled: bool) -> Self {
        self.reset_on_props_change = enabled;
        self
    }

    pub fn props(mut self, value: &impl Hash) -> Self {
        self.props = Some(fingerprint(value));
        self
    }

    /// Adds a tag to every `FailureRecord` this boundary captures.
    pub fn context(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(tag.into(), value.into());
        self
    }

    pub fn render(self) -> View {
        self.render_with_state().0
    }

    pub fn render_with_state(mut self) -> (View, BoundarySnapshot) {
        let state = remember_with_key(format!("boundary:{}", self.key), || {
            RefCell::new(BoundaryState::new(self.name.clone()))
        });
        let props = fingerprint(&(&self.name, &self.context, &self.reset_keys, self.props));

        self.check_resets(&state, props);

        let failed = state.borrow().failure.clone();
        let record = match failed {
            Some(record) => record,
            None => {
                let token = state.borrow().reset_token;
                match self.compose_content(token) {
                    Ok(view) => {
                        let snapshot = state.borrow().snapshot();
                        return (view, snapshot);
                    }
                    Err(err) => self.capture(&state, err),
                }
            }
        };

        let handle = ResetHandle {
            state: Rc::downgrade(&state),
        };
        let snapshot = state.borrow().snapshot();
        // Not caught here: a failing fallback belongs to the enclosing boundary.
        let view = match &self.fallback {
            Some(fallback) => fallback.view(&record, handle),
            None => DefaultFallback(&record, handle),
        };
        (view, snapshot)
    }

    fn check_resets(&self, state: &Rc<RefCell<BoundaryState>>, props: u64) {
        let trigger = {
            let mut s = state.borrow_mut();
            let keys_changed = match &self.reset_keys {
                Some(keys) => s.prev_reset_keys.as_ref() != Some(keys),
                None => false,
            };
            let props_changed =
                self.reset_on_props_change && s.prev_props.is_some_and(|prev| prev != props);
            s.prev_reset_keys = self.reset_keys.clone();
            s.prev_props = Some(props);

            if s.failure.is_none() {
                None
            } else if keys_changed {
                Some("reset keys changed")
            } else if props_changed {
                Some("props changed")
            } else {
                None
            }
        };
        if let Some(reason) = trigger {
            log::debug!("{}: {reason}", self.name);
            BoundaryState::schedule_reset(state);
        }
    }

    fn compose_content(&mut self, token: u64) -> Result<View, RenderError> {
        let Some(content) = self.content.take() else {
            return Err(RenderError::new("boundary content composed twice"));
        };
        clear_failure_origin();
        let scope = format!("{}@{}", self.key, token);
        match catch_unwind(AssertUnwindSafe(move || keyed(scope, content))) {
            Ok(result) => result,
            Err(payload) => Err(RenderError::from_panic(payload)),
        }
    }

    fn capture(&self, state: &Rc<RefCell<BoundaryState>>, err: RenderError) -> FailureRecord {
        let origin = take_failure_origin(&err).unwrap_or_else(|| self.name.clone());
        let record = FailureRecord::capture(&err, origin, self.context.clone());
        {
            let mut s = state.borrow_mut();
            s.failure = Some(record.clone());
            s.failures_captured += 1;
        }
        log::error!(
            target: "bulwark::boundary",
            "{} caught a failure in {}: {}",
            self.name,
            record.origin,
            record.message
        );

        if let Some(on_failure) = &self.on_failure {
            let notified = catch_unwind(AssertUnwindSafe(|| on_failure(&record)));
            if let Err(payload) = notified {
                log::error!(
                    target: "bulwark::boundary",
                    "{}: on_failure handler failed and was ignored: {}",
                    self.name,
                    RenderError::from_panic(payload)
                );
            }
        }
        record
    }
}

fn fingerprint(value: &impl Hash) -> u64 {
    ahash::RandomState::with_seeds(0x5eed, 0xb0, 0x0d, 0xa1).hash_one(value)
}

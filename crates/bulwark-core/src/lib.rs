//! # Runtime, Resources, and Failures
//!
//! Bulwark is a small immediate-mode rendering engine built around two
//! supervisory primitives: fault isolation (error boundaries, in
//! `bulwark-ui`) and deferred resources that suspend rendering until their
//! value is ready. This crate holds everything those primitives run on:
//!
//! - `View`: the rendered output of one pass.
//! - `remember*`: composition slots addressed by key path.
//! - `Signal<T>`: observable state that requests a new frame on write.
//! - `Scheduler`: the single-threaded render loop, task executor and timers.
//! - `DeferredResource<T>`: an async value readable synchronously.
//! - `FailureRecord` / `ErrorLog`: what a boundary captures and reports.
//!
//! ## Render loop
//!
//! ```rust
//! use bulwark_core::*;
//!
//! let mut scheduler = Scheduler::new();
//! let frame = scheduler.frame(|| {
//!     let count = remember(|| signal(0));
//!     View::new(0, ViewKind::Text { text: format!("count = {}", count.get()) })
//! });
//! assert!(frame.view.contains_text("count = 0"));
//! ```
//!
//! Every pass composes the whole tree. Slots that a pass does not visit are
//! dropped at the end of it, which is how a subtree unmounts.
//!
//! ## Deferred resources
//!
//! ```rust,ignore
//! let user = DeferredResource::create(|| async {
//!     sleep(Duration::from_secs(2)).await;
//!     Ok(User { name: "John Doe".into() })
//! });
//!
//! match user.read() {
//!     Read::Ready(user) => Text(user.name),
//!     Read::Pending(completion) => suspend(completion),
//!     Read::Failed(err) => return Err(err.into()),
//! }
//! ```
//!
//! The producer starts immediately. `read()` never blocks: a pending read
//! hands back the `Completion` the nearest `Suspense` waits on, and the
//! settled resource requests a frame so the read is retried.
//!
//! ## Scheduling
//!
//! `Scheduler::tick` is the "next scheduling opportunity": it fires due
//! timers, polls woken tasks and runs callbacks deferred with `post`. It never
//! runs inside a render pass.

pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod resource;
pub mod runtime;
pub mod signal;
pub mod telemetry;
pub mod tests;
pub mod view;

pub use clock::*;
pub use config::*;
pub use effects::*;
pub use error::*;
pub use executor::*;
pub use prelude::*;
pub use resource::*;
pub use runtime::*;
pub use signal::*;
pub use telemetry::*;
pub use view::*;

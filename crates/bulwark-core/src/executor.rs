//! Local task executor, deferred callbacks and timers.
//!
//! Everything here runs on the render thread. Futures are `!Send`; only the
//! ready queue is shared with wakers, since `Waker` must be `Send + Sync`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::task::{ArcWake, waker};
use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};
use web_time::{Duration, Instant};

use crate::clock;

new_key_type! {
    pub struct TaskId;
    pub struct PostId;
    pub struct TimerId;
}

#[derive(Default)]
struct ReadyQueue(Mutex<VecDeque<TaskId>>);

struct TaskWaker {
    id: TaskId,
    queue: Arc<ReadyQueue>,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.queue.0.lock().push_back(arc_self.id);
    }
}

struct Timer {
    deadline: Instant,
    waker: Option<Waker>,
}

#[derive(Default)]
struct Executor {
    // `None` while the task is being polled.
    tasks: RefCell<SlotMap<TaskId, Option<LocalBoxFuture<'static, ()>>>>,
    ready: Arc<ReadyQueue>,
    posted: RefCell<SlotMap<PostId, Box<dyn FnOnce()>>>,
    post_order: RefCell<VecDeque<PostId>>,
    timers: RefCell<SlotMap<TimerId, Timer>>,
}

thread_local! {
    static EXECUTOR: Executor = Executor::default();
}

/// Spawns a local future. It is first polled on the next `Scheduler::tick`.
pub fn spawn(future: impl Future<Output = ()> + 'static) -> TaskId {
    EXECUTOR.with(|ex| {
        let id = ex.tasks.borrow_mut().insert(Some(future.boxed_local()));
        ex.ready.0.lock().push_back(id);
        id
    })
}

/// Number of spawned tasks that have not completed.
pub fn pending_tasks() -> usize {
    EXECUTOR.with(|ex| ex.tasks.borrow().len())
}

/// Handle to a callback deferred with `post`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostHandle {
    id: PostId,
}

impl PostHandle {
    /// Drops the callback if it has not run yet.
    pub fn cancel(&self) {
        let _ = EXECUTOR.try_with(|ex| {
            if let Ok(mut posted) = ex.posted.try_borrow_mut() {
                posted.remove(self.id);
            }
        });
    }

    pub fn is_pending(&self) -> bool {
        EXECUTOR
            .try_with(|ex| ex.posted.borrow().contains_key(self.id))
            .unwrap_or(false)
    }
}

/// Defers `f` to the next scheduling opportunity. Never runs inside the
/// render pass that posted it.
pub fn post(f: impl FnOnce() + 'static) -> PostHandle {
    EXECUTOR.with(|ex| {
        let id = ex.posted.borrow_mut().insert(Box::new(f));
        ex.post_order.borrow_mut().push_back(id);
        PostHandle { id }
    })
}

/// Polls every woken task once. Returns how many polls happened.
pub(crate) fn run_ready() -> usize {
    EXECUTOR.with(|ex| {
        let mut polled = 0;
        loop {
            let Some(id) = ex.ready.0.lock().pop_front() else {
                break;
            };
            let Some(mut future) = ex.tasks.borrow_mut().get_mut(id).and_then(Option::take) else {
                // finished, or woken twice in one round
                continue;
            };
            polled += 1;
            let task_waker = waker(Arc::new(TaskWaker {
                id,
                queue: ex.ready.clone(),
            }));
            let mut cx = Context::from_waker(&task_waker);
            match future.poll_unpin(&mut cx) {
                Poll::Ready(()) => {
                    ex.tasks.borrow_mut().remove(id);
                }
                Poll::Pending => {
                    if let Some(slot) = ex.tasks.borrow_mut().get_mut(id) {
                        *slot = Some(future);
                    }
                }
            }
        }
        polled
    })
}

/// Runs the callbacks posted before this call. Callbacks they post wait for
/// the next round.
pub(crate) fn run_posted() -> usize {
    let batch: Vec<PostId> = EXECUTOR.with(|ex| ex.post_order.borrow_mut().drain(..).collect());
    let mut ran = 0;
    for id in batch {
        let callback = EXECUTOR.with(|ex| ex.posted.borrow_mut().remove(id));
        if let Some(callback) = callback {
            callback();
            ran += 1;
        }
    }
    ran
}

/// Wakes every timer whose deadline is at or before `now`.
pub(crate) fn fire_due_timers(now: Instant) -> usize {
    let due: Vec<Waker> = EXECUTOR.with(|ex| {
        let mut timers = ex.timers.borrow_mut();
        let ids: Vec<TimerId> = timers
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .map(|(id, _)| id)
            .collect();
        ids.into_iter()
            .filter_map(|id| timers.remove(id).and_then(|t| t.waker))
            .collect()
    });
    let fired = due.len();
    for waker in due {
        waker.wake();
    }
    fired
}

/// Earliest pending timer deadline.
pub fn next_deadline() -> Option<Instant> {
    EXECUTOR.with(|ex| ex.timers.borrow().values().map(|t| t.deadline).min())
}

/// Future returned by `sleep`.
pub struct Sleep {
    deadline: Instant,
    timer: Option<TimerId>,
}

/// Completes once the installed clock reaches `now() + duration`.
pub fn sleep(duration: Duration) -> Sleep {
    Sleep {
        deadline: clock::now() + duration,
        timer: None,
    }
}

impl Sleep {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    fn cancel_timer(&mut self) {
        if let Some(id) = self.timer.take() {
            let _ = EXECUTOR.try_with(|ex| {
                if let Ok(mut timers) = ex.timers.try_borrow_mut() {
                    timers.remove(id);
                }
            });
        }
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if clock::now() >= this.deadline {
            this.cancel_timer();
            return Poll::Ready(());
        }
        EXECUTOR.with(|ex| {
            let mut timers = ex.timers.borrow_mut();
            match this.timer.and_then(|id| timers.get_mut(id)) {
                Some(timer) => timer.waker = Some(cx.waker().clone()),
                None => {
                    this.timer = Some(timers.insert(Timer {
                        deadline: this.deadline,
                        waker: Some(cx.waker().clone()),
                    }));
                }
            }
        });
        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

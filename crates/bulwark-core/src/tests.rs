#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;
    use std::rc::Rc;

    use crate::*;

    #[derive(Clone, Debug, PartialEq)]
    struct User {
        name: String,
    }

    fn text(s: &str) -> View {
        View::new(0, ViewKind::Text { text: s.into() })
    }

    fn manual_scheduler() -> (Scheduler, ManualClock) {
        let clock = ManualClock::new();
        let scheduler = Scheduler::new().with_clock(clock.clone());
        (scheduler, clock)
    }

    #[test]
    fn test_signal_basic() {
        let sig = signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);
    }

    #[test]
    fn test_signal_write_requests_frame() {
        let mut scheduler = Scheduler::new();
        let sig = signal(0);
        scheduler.frame(|| text("idle"));
        assert!(!scheduler.needs_frame());

        sig.set(1);
        assert!(scheduler.needs_frame());
    }

    #[test]
    fn test_signal_subscription() {
        let sig = signal(0);
        let called = Rc::new(RefCell::new(false));

        let called_clone = called.clone();
        sig.subscribe(move |_| {
            *called_clone.borrow_mut() = true;
        });

        sig.set(42);
        assert!(*called.borrow());
    }

    #[test]
    fn test_signal_subscriber_reads_current_value() {
        let sig = signal(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (reader, log) = (sig.clone(), seen.clone());
        let id = sig.subscribe(move |v| log.borrow_mut().push((*v, reader.get())));

        sig.set(2);
        sig.update(|v| *v *= 10);
        assert_eq!(*seen.borrow(), vec![(2, 2), (20, 20)]);

        assert!(sig.unsubscribe(id));
        assert!(!sig.unsubscribe(id));
        sig.set(3);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_key_based_remember() {
        let val1 = remember_with_key("test", || 42);
        let val2 = remember_with_key("test", || 100);

        // Should return the same instance
        assert_eq!(*val1, 42);
        assert_eq!(*val2, 42); // Not 100, because key exists
    }

    #[test]
    fn test_positional_remember_survives_passes() {
        let mut scheduler = Scheduler::new();
        let build = || {
            let a = remember(|| signal(1));
            let b = remember(|| signal(2));
            text(&format!("{} {}", a.get(), b.get()))
        };
        scheduler.frame(build);
        let frame = scheduler.frame(|| {
            let a = remember(|| signal(10));
            a.set(5);
            let b = remember(|| signal(20));
            text(&format!("{} {}", a.get(), b.get()))
        });
        assert!(frame.view.contains_text("5 2"));
    }

    #[test]
    fn test_keyed_scope_isolates_state() {
        let mut scheduler = Scheduler::new();
        let render = |key: u32| {
            keyed(format!("item{key}"), || {
                let count = remember(|| signal(0));
                count.update(|c| *c += 1);
                text(&count.get().to_string())
            })
        };

        scheduler.frame(|| render(1));
        let second = scheduler.frame(|| render(1));
        assert!(second.view.contains_text("2"));

        let fresh = scheduler.frame(|| render(2));
        assert!(fresh.view.contains_text("1"));
    }

    #[test]
    fn test_unvisited_slots_unmount() {
        let mut scheduler = Scheduler::new();
        let mounted = Rc::new(Cell::new(false));
        let show = Rc::new(Cell::new(true));

        let build = {
            let mounted = mounted.clone();
            let show = show.clone();
            move || {
                if show.get() {
                    keyed("child", || {
                        let mounted = mounted.clone();
                        effect(move || {
                            mounted.set(true);
                            on_unmount(move || mounted.set(false))
                        });
                    });
                }
                text("root")
            }
        };

        scheduler.frame(&build);
        assert!(mounted.get());
        scheduler.frame(&build);
        assert!(mounted.get());

        show.set(false);
        scheduler.frame(&build);
        assert!(!mounted.get());
    }

    #[test]
    fn test_disposable_effect_reruns_on_key_change() {
        let mut scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::<String>::new()));

        for key in [1, 1, 2] {
            let log = log.clone();
            scheduler.frame(move || {
                let log2 = log.clone();
                disposable_effect("counter", key, move || {
                    log2.borrow_mut().push(format!("start {key}"));
                    let log3 = log2.clone();
                    on_unmount(move || log3.borrow_mut().push(format!("stop {key}")))
                });
                text("x")
            });
        }

        assert_eq!(*log.borrow(), vec!["start 1", "stop 1", "start 2"]);
    }

    #[test]
    fn test_dispose_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let d = Dispose::new(move || c.set(c.get() + 1));
        d.run();
        d.run();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_post_runs_on_tick_not_before() {
        let mut scheduler = Scheduler::new();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        let handle = post(move || r.set(true));

        assert!(handle.is_pending());
        assert!(!ran.get());
        let stats = scheduler.tick();
        assert!(ran.get());
        assert_eq!(stats.callbacks_run, 1);
        assert!(!handle.is_pending());
    }

    #[test]
    fn test_cancelled_post_never_runs() {
        let mut scheduler = Scheduler::new();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        let handle = post(move || r.set(true));
        handle.cancel();
        scheduler.tick();
        assert!(!ran.get());
    }

    #[test]
    fn test_sleep_waits_for_clock() {
        let (mut scheduler, clock) = manual_scheduler();
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        spawn(async move {
            sleep(Duration::from_millis(500)).await;
            d.set(true);
        });

        scheduler.tick();
        assert!(!done.get());
        assert!(scheduler.next_deadline().is_some());

        clock.advance(Duration::from_millis(499));
        scheduler.tick();
        assert!(!done.get());

        clock.advance(Duration::from_millis(1));
        scheduler.tick();
        assert!(done.get());
        assert_eq!(crate::executor::pending_tasks(), 0);
        assert!(scheduler.next_deadline().is_none());
    }

    #[test]
    fn test_resource_suspends_then_resolves() {
        let (mut scheduler, clock) = manual_scheduler();
        let user = DeferredResource::create(|| async {
            sleep(Duration::from_secs(2)).await;
            Ok(User {
                name: "John Doe".into(),
            })
        });

        scheduler.tick();
        let completion = match user.read() {
            Read::Pending(c) => c,
            other => panic!("expected a pending read, got {other:?}"),
        };
        assert!(!completion.is_settled());

        scheduler.frame(|| text("loading"));
        clock.advance(Duration::from_secs(2));
        scheduler.tick();

        assert!(completion.is_settled());
        assert!(scheduler.needs_frame());
        match user.read() {
            Read::Ready(u) => assert_eq!(u.name, "John Doe"),
            other => panic!("expected a resolved read, got {other:?}"),
        }
    }

    #[test]
    fn test_resource_producer_runs_eagerly() {
        let started = Rc::new(Cell::new(false));
        let s = started.clone();
        let _res: DeferredResource<u32> = DeferredResource::create(move || {
            s.set(true);
            async { Ok(1) }
        });
        assert!(started.get());
    }

    #[test]
    fn test_resource_rejection_is_read_as_failure() {
        let mut scheduler = Scheduler::new();
        let res: DeferredResource<User> =
            DeferredResource::create(|| async { Err(ResourceError::rejected("NETWORK_ERROR")) });
        scheduler.tick();

        match res.read() {
            Read::Failed(e) => {
                assert_eq!(e.to_string(), "NETWORK_ERROR");
                assert_eq!(RenderError::from(e).message(), "NETWORK_ERROR");
            }
            other => panic!("expected a failed read, got {other:?}"),
        }
    }

    #[test]
    fn test_resource_status_is_monotonic() {
        let mut scheduler = Scheduler::new();
        let res = DeferredResource::create(|| async { Ok(7u32) });
        assert_eq!(res.status(), ResourceStatus::Pending);
        scheduler.tick();
        assert_eq!(res.status(), ResourceStatus::Resolved(7));

        assert!(!res.settle_for_test(Err(ResourceError::rejected("late"))));
        assert!(!res.settle_for_test(Ok(8)));
        assert_eq!(res.status(), ResourceStatus::Resolved(7));
    }

    #[test]
    fn test_shared_handle_sees_single_resolution() {
        let mut scheduler = Scheduler::new();
        let a = DeferredResource::create(|| async { Ok(String::from("posts")) });
        let b = a.clone();
        scheduler.tick();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.status(), b.status());
        assert!(a.completion().ptr_eq(&b.completion()));
    }

    #[test]
    fn test_independent_resources_settle_independently() {
        let (mut scheduler, clock) = manual_scheduler();
        let fast = DeferredResource::create(|| async {
            sleep(Duration::from_secs(1)).await;
            Ok("posts")
        });
        let slow = DeferredResource::create(|| async {
            sleep(Duration::from_secs(2)).await;
            Ok("user")
        });
        scheduler.tick();
        clock.advance(Duration::from_secs(1));
        scheduler.tick();

        assert!(fast.is_settled());
        assert!(!slow.is_settled());
    }

    #[test]
    fn test_with_timeout_fails_slow_producer() {
        let (mut scheduler, clock) = manual_scheduler();
        let res: DeferredResource<u32> = DeferredResource::create(|| {
            with_timeout(
                async {
                    sleep(Duration::from_secs(30)).await;
                    Ok(1)
                },
                Duration::from_secs(5),
            )
        });
        scheduler.tick();
        clock.advance(Duration::from_secs(5));
        scheduler.tick();

        assert_eq!(
            res.status(),
            ResourceStatus::Failed(ResourceError::TimedOut {
                after: Duration::from_secs(5)
            })
        );
    }

    #[test]
    fn test_with_timeout_keeps_fast_result_and_drops_timer() {
        let (mut scheduler, clock) = manual_scheduler();
        let res: DeferredResource<u32> = DeferredResource::create(|| {
            with_timeout(
                async {
                    sleep(Duration::from_secs(1)).await;
                    Ok(3)
                },
                Duration::from_secs(5),
            )
        });
        scheduler.tick();
        clock.advance(Duration::from_secs(1));
        scheduler.tick();

        assert_eq!(res.status(), ResourceStatus::Resolved(3));
        assert!(scheduler.next_deadline().is_none());
    }

    #[test]
    fn test_completion_wakes_every_waiter_once() {
        let (mut scheduler, clock) = manual_scheduler();
        let res = DeferredResource::create(|| async {
            sleep(Duration::from_secs(1)).await;
            Ok(1u8)
        });
        let woken = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let completion = res.completion();
            let woken = woken.clone();
            spawn(async move {
                completion.await;
                woken.set(woken.get() + 1);
            });
        }
        scheduler.tick();
        scheduler.tick();
        assert_eq!(woken.get(), 0);

        clock.advance(Duration::from_secs(1));
        scheduler.tick();
        assert_eq!(woken.get(), 3);
        assert_eq!(pending_tasks(), 0);

        let ready = DeferredResource::resolved(2u8).completion();
        assert!(ready.is_settled());
        let observed = Rc::new(Cell::new(false));
        let o = observed.clone();
        spawn(async move {
            ready.await;
            o.set(true);
        });
        scheduler.tick();
        assert!(observed.get());
    }

    #[test]
    fn test_completion_wakes_waiting_task() {
        let mut scheduler = Scheduler::new();
        let res = DeferredResource::create(|| async { Ok(1u8) });
        let observed = Rc::new(Cell::new(false));
        let o = observed.clone();
        let completion = res.completion();
        spawn(async move {
            completion.await;
            o.set(true);
        });
        scheduler.tick();
        assert!(observed.get());
    }

    #[test]
    fn test_render_error_from_panic_payloads() {
        let raised = std::panic::catch_unwind(|| raise("I crashed!")).unwrap_err();
        assert_eq!(
            RenderError::from_panic(raised),
            RenderError::new("I crashed!")
        );

        let formatted = std::panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(RenderError::from_panic(formatted).message(), "boom 1");

        let opaque = std::panic::catch_unwind(|| std::panic::panic_any(5u8)).unwrap_err();
        assert_eq!(RenderError::from_panic(opaque).message(), "Unknown panic");
    }

    #[test]
    fn test_component_records_innermost_origin() {
        crate::error::clear_failure_origin();
        let out: Result<View, RenderError> = component("App", || {
            component("Profile", || Err(RenderError::new("bad")))
        });
        let err = out.err().expect("profile fails");
        assert_eq!(
            crate::error::take_failure_origin(&err).as_deref(),
            Some("App > Profile")
        );
    }

    #[test]
    fn test_component_records_origin_on_panic() {
        crate::error::clear_failure_origin();
        let payload = std::panic::catch_unwind(|| {
            component("Outer", || component("Buggy", || -> View { raise("I crashed!") }))
        })
        .unwrap_err();
        let err = RenderError::from_panic(payload);
        assert_eq!(
            crate::error::take_failure_origin(&err).as_deref(),
            Some("Outer > Buggy")
        );
    }

    #[test]
    fn test_raised_failures_skip_the_panic_hook() {
        thread_local! {
            static REPORTED: Cell<usize> = const { Cell::new(0) };
        }
        // settle the once-only hook first so nothing else rewires it below
        crate::error::install_panic_hook();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            REPORTED.with(|r| r.set(r.get() + 1));
            previous(info);
        }));
        crate::error::silence_raised_failures();

        let _ = std::panic::catch_unwind(|| -> View { raise("handled by a boundary") });
        assert_eq!(REPORTED.with(Cell::get), 0);

        let _ = std::panic::catch_unwind(|| -> View { panic!("not a render failure") });
        assert_eq!(REPORTED.with(Cell::get), 1);
    }

    #[test]
    fn test_handled_failure_leaves_no_origin_behind() {
        crate::error::clear_failure_origin();
        let out: Result<View, RenderError> = component("Page", || {
            let _widget = component("OptionalWidget", || Err(RenderError::new("widget offline")))
                .unwrap_or_else(|_| text("widget unavailable"));
            Err(RenderError::new("page failed"))
        });
        let err = out.err().expect("page fails");
        assert_eq!(
            crate::error::take_failure_origin(&err).as_deref(),
            Some("Page")
        );

        crate::error::clear_failure_origin();
        let _ = component("OptionalWidget", || Err::<View, _>(RenderError::new("widget offline")));
        assert_eq!(
            crate::error::take_failure_origin(&RenderError::new("page failed")),
            None
        );
    }

    #[test]
    fn test_panic_after_handled_failure_reports_panicking_component() {
        crate::error::clear_failure_origin();
        let _ = component("OptionalWidget", || Err::<View, _>(RenderError::new("widget offline")));
        let payload = std::panic::catch_unwind(|| {
            component("Page", || component("Chart", || -> View { raise("axis overflow") }))
        })
        .unwrap_err();
        let err = RenderError::from_panic(payload);
        assert_eq!(
            crate::error::take_failure_origin(&err).as_deref(),
            Some("Page > Chart")
        );
    }

    fn record(message: &str) -> FailureRecord {
        let mut tags = BTreeMap::new();
        tags.insert("userId".to_string(), "user_123".to_string());
        FailureRecord::capture(&RenderError::new(message), "UnstableComponent", tags)
    }

    #[test]
    fn test_error_log_evicts_oldest_first() {
        let log = ErrorLog::new(10);
        for i in 0..11 {
            log.record(&record(&format!("failure {i}")));
        }
        let entries = log.entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].message, "failure 10");
        assert_eq!(entries[9].message, "failure 1");
        assert!(entries.iter().all(|e| e.message != "failure 0"));
    }

    #[test]
    fn test_error_log_entries_carry_context() {
        let log = ErrorLog::new(3);
        let entry = log.record(&record("API_ERROR"));
        assert_eq!(entry.component_path, "UnstableComponent");
        assert_eq!(
            entry.context_tags.get("userId").map(String::as_str),
            Some("user_123")
        );
        let second = log.record(&record("API_ERROR"));
        assert_ne!(entry.id, second.id);
    }

    #[test]
    fn test_error_log_sink_and_clear() {
        let log = ErrorLog::from_config();
        assert_eq!(log.capacity(), RuntimeConfig::default().error_log_capacity);
        let sink = log.sink();
        sink(&record("VALIDATION_ERROR"));
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_view_click_and_queries() {
        let clicked = Rc::new(Cell::new(0));
        let c = clicked.clone();
        let view = View::new(0, ViewKind::Column).with_children(vec![
            text("hello"),
            View::new(
                0,
                ViewKind::Button {
                    text: "Go".into(),
                    on_click: Some(Rc::new(move || c.set(c.get() + 1))),
                },
            ),
        ]);
        assert!(view.contains_text("hell"));
        assert!(view.click("Go"));
        assert!(!view.click("Missing"));
        assert_eq!(clicked.get(), 1);
        assert!(!view.is_suspended());
    }
}

mod common;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use tbwatch::watch::{debounce_loop, on_trigger, watch, OnTrigger, WatchFilter, WatchSignal};
use tbwatch_test_utils::{init_tracing, with_timeout};

const QUIET: Duration = Duration::from_millis(100);

fn filter() -> WatchFilter {
    WatchFilter::new(
        "/proj",
        &["**/*.v".to_string()],
        &[PathBuf::from("/proj/build")],
    )
    .unwrap()
}

fn counting_trigger(count: &Arc<AtomicUsize>) -> OnTrigger {
    let count = Arc::clone(count);
    on_trigger(move || {
        let count = Arc::clone(&count);
        async move {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

fn changed(rel: &str) -> WatchSignal {
    WatchSignal::Changed(PathBuf::from("/proj").join(rel))
}

#[tokio::test(start_paused = true)]
async fn burst_within_quiet_period_triggers_once() {
    init_tracing();
    let count = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(debounce_loop(rx, filter(), QUIET, counting_trigger(&count)));

    for _ in 0..5 {
        tx.send(changed("a.v")).unwrap();
        sleep(Duration::from_millis(20)).await;
    }
    sleep(Duration::from_millis(500)).await;

    drop(tx);
    let triggers = handle.await.unwrap();
    assert_eq!(triggers, 1);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn events_spaced_beyond_quiet_period_each_trigger() {
    init_tracing();
    let count = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(debounce_loop(rx, filter(), QUIET, counting_trigger(&count)));

    for _ in 0..3 {
        tx.send(changed("sub/b_tb.v")).unwrap();
        sleep(Duration::from_millis(250)).await;
    }

    drop(tx);
    assert_eq!(handle.await.unwrap(), 3);
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn irrelevant_changes_never_trigger() {
    let count = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(debounce_loop(rx, filter(), QUIET, counting_trigger(&count)));

    tx.send(changed("README.md")).unwrap();
    tx.send(changed("build/a_tb.v.out")).unwrap();
    tx.send(changed("build/gen.v")).unwrap();
    tx.send(WatchSignal::Changed(PathBuf::from("/elsewhere/a.v"))).unwrap();
    sleep(Duration::from_millis(500)).await;

    drop(tx);
    assert_eq!(handle.await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn established_schedules_the_initial_run() {
    let count = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(debounce_loop(rx, filter(), QUIET, counting_trigger(&count)));

    tx.send(WatchSignal::Established).unwrap();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0, "fired before the quiet period");
    sleep(Duration::from_millis(100)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    drop(tx);
    assert_eq!(handle.await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_trigger_keeps_the_loop_alive() {
    init_tracing();
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&attempts);
    let trigger = on_trigger(move || {
        let seen = Arc::clone(&seen);
        async move {
            seen.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("compile server down")
        }
    });
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(debounce_loop(rx, filter(), QUIET, trigger));

    tx.send(changed("a.v")).unwrap();
    sleep(Duration::from_millis(250)).await;
    tx.send(changed("a.v")).unwrap();
    sleep(Duration::from_millis(250)).await;

    drop(tx);
    assert_eq!(handle.await.unwrap(), 2);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn real_watch_runs_once_on_start_and_stops_cleanly() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    common::write_file(tmp.path(), "a.v", "module a; endmodule");

    let count = Arc::new(AtomicUsize::new(0));
    let session = watch(
        tmp.path(),
        &["**/*.v".to_string()],
        &[tmp.path().join("build")],
        Duration::from_millis(20),
        counting_trigger(&count),
    )
    .unwrap();

    with_timeout(async {
        while count.load(Ordering::SeqCst) == 0 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    let runs = with_timeout(session.stop()).await.unwrap();
    assert!(runs >= 1);
}

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{Call, loaded_sync_with_debounce};
use gradewarrior::models::AssignmentEdit;
use gradewarrior::services::DebounceScheduler;

#[tokio::test]
async fn test_scheduler_runs_once_after_quiet_period() {
    let scheduler = DebounceScheduler::new(Duration::from_millis(100));
    let runs = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let runs = runs.clone();
        scheduler.schedule(move || async move {
            runs.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
    }
    assert!(scheduler.is_scheduled());
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(!scheduler.is_scheduled());
}

#[tokio::test]
async fn test_scheduler_cancel_prevents_run() {
    let scheduler = DebounceScheduler::new(Duration::from_millis(50));
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = runs.clone();
    scheduler.schedule(move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert!(scheduler.cancel());
    assert!(!scheduler.cancel());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_edits_within_window_flush_once() {
    let (gateway, sync) = loaded_sync_with_debounce(Duration::from_millis(200)).await;

    for grade in [60.0, 70.0, 80.0] {
        sync.handle_assignment_change("2", AssignmentEdit::Grade(grade));
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(sync.status().flush_scheduled);
    assert_eq!(gateway.count(|c| matches!(c, Call::UpdateAssignment(_))), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(gateway.count(|c| matches!(c, Call::UpdateAssignment(_))), 1);
    assert!(gateway.calls().contains(&Call::UpdateAssignment(
        gradewarrior::models::UpdateAssignmentInput {
            id: "2".to_string(),
            name: Some("Homework".to_string()),
            grade: Some(80.0),
            weight: Some(50.0),
            is_theoretical: Some(false),
        }
    )));
    assert_eq!(sync.pending_count(), 0);
    assert!(sync.status().last_synced_at.is_some());
}

#[tokio::test]
async fn test_sync_now_cancels_scheduled_flush() {
    let (gateway, sync) = loaded_sync_with_debounce(Duration::from_millis(100)).await;

    sync.handle_course_name_change("1", "Algebra");
    assert!(sync.status().flush_scheduled);

    sync.handle_sync_now().await;
    assert!(!sync.status().flush_scheduled);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(gateway.count(|c| matches!(c, Call::UpdateCourse(_))), 1);
}

#[tokio::test]
async fn test_failed_entries_retry_on_next_cycle() {
    let (gateway, sync) = loaded_sync_with_debounce(Duration::from_millis(100)).await;
    gateway.fail("update_assignment");

    sync.handle_assignment_change("6", AssignmentEdit::Grade(99.0));
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert!(gateway.count(|c| matches!(c, Call::UpdateAssignment(_))) >= 1);
    assert_eq!(sync.pending_count(), 1);
    assert!(sync.status().flush_scheduled);

    gateway.recover("update_assignment");
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(sync.pending_count(), 0);
    assert_eq!(gateway.server_courses()[1].assignments[0].grade, 99.0);
}

#[tokio::test]
async fn test_rearm_does_not_abort_running_task() {
    let scheduler = DebounceScheduler::new(Duration::from_millis(30));
    let finished = Arc::new(AtomicUsize::new(0));

    let counter = finished.clone();
    scheduler.schedule(move || async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        counter.fetch_add(1, Ordering::SeqCst);
    });
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!scheduler.is_scheduled());

    let counter = finished.clone();
    scheduler.schedule(move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert!(scheduler.cancel());

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_edit_during_timer_flush_keeps_that_flush() {
    let (gateway, sync) = loaded_sync_with_debounce(Duration::from_millis(50)).await;
    gateway.slow("update_assignment", Duration::from_millis(200));

    sync.handle_assignment_change("2", AssignmentEdit::Grade(61.0));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(gateway.count(|c| matches!(c, Call::UpdateAssignment(_))), 1);

    // Re-arms the debounce while the first flush waits on the gateway.
    sync.handle_assignment_change("6", AssignmentEdit::Grade(88.0));
    tokio::time::sleep(Duration::from_millis(600)).await;

    let server = gateway.server_courses();
    assert_eq!(server[0].assignment("2").unwrap().grade, 61.0);
    assert_eq!(server[1].assignment("6").unwrap().grade, 88.0);
    assert_eq!(sync.pending_count(), 0);
}

#[test]
fn test_schedule_outside_runtime_arms_nothing() {
    let scheduler = DebounceScheduler::new(Duration::from_millis(10));
    scheduler.schedule(|| async {});
    assert!(!scheduler.is_scheduled());
    assert!(!scheduler.cancel());
}

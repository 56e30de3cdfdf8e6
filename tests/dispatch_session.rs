//! Search/dispatch screen driven through the async session with real timers.

use std::time::Duration;

use tokio::time::timeout;

use kok::dispatch::{
    DispatchOutcome, DispatchPhase, DispatchSession, ScreenEvent, SearchOutcome, SearchScreen,
};

/// Maximum time any test waits for a timer-driven event.
const TEST_TIMEOUT: Duration = Duration::from_secs(2);

fn session(delay_ms: u64) -> DispatchSession {
    DispatchSession::with_timing(
        SearchScreen::default(),
        Duration::from_millis(delay_ms),
        Duration::from_millis(delay_ms),
    )
}

#[tokio::test]
async fn empty_symptom_never_opens_sheet() {
    for patient in [None, Some(2)] {
        let mut session = session(10);
        session
            .with_screen(|s| {
                s.set_symptom("");
                if let Some(id) = patient {
                    s.select_patient(id);
                }
            })
            .await;

        let SearchOutcome::Rejected(toast) = session.submit_search().await else {
            panic!("search with empty symptom must be rejected");
        };
        assert_eq!(toast.message, "증상을 입력해주세요.");
        let (open, listed) = session
            .view(|s| (s.is_sheet_open(), s.hospitals().len()))
            .await;
        assert!(!open);
        assert_eq!(listed, 0);
    }
}

#[tokio::test]
async fn dispatch_reveals_second_wave_and_keeps_selection() {
    let mut session = session(30);
    let mut rx = session.subscribe();

    session
        .with_screen(|s| {
            s.set_symptom("호흡 곤란");
            s.select_patient(1);
        })
        .await;
    assert_eq!(session.submit_search().await, SearchOutcome::Opened);

    session
        .with_screen(|s| {
            s.enter_multi_select();
            assert!(s.tap_hospital(1));
            assert!(s.tap_hospital(3));
            assert!(!s.tap_hospital(2));
        })
        .await;

    assert_eq!(session.dispatch().await, DispatchOutcome::Connecting(vec![1, 3]));
    assert_eq!(session.view(|s| s.phase()).await, DispatchPhase::Connecting);

    let completed = timeout(TEST_TIMEOUT, async {
        loop {
            if let ScreenEvent::DispatchCompleted { revealed } = rx.recv().await.unwrap() {
                break revealed;
            }
        }
    })
    .await
    .expect("dispatch did not complete in time");
    assert_eq!(completed, 3);

    let (phase, ids, selected) = session
        .view(|s| {
            (
                s.phase(),
                s.hospitals().iter().map(|h| h.id).collect::<Vec<_>>(),
                s.selected().iter().copied().collect::<Vec<_>>(),
            )
        })
        .await;
    assert_eq!(phase, DispatchPhase::Completed);
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(selected, vec![1, 3]);
}

#[tokio::test]
async fn newer_toast_outlives_older_timer() {
    let mut session = DispatchSession::with_timing(
        SearchScreen::default(),
        Duration::from_millis(10),
        Duration::from_millis(60),
    );
    let first = session.show_toast("first").await;
    tokio::time::sleep(Duration::from_millis(40)).await;
    let second = session.show_toast("second").await;

    // The first toast's timer would have fired here; it was replaced.
    tokio::time::sleep(Duration::from_millis(40)).await;
    let visible = session.view(|s| s.toast().cloned()).await;
    assert_eq!(visible.map(|t| t.id), Some(second.id));
    assert_ne!(first.id, second.id);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(session.view(|s| s.toast().is_none()).await);
}

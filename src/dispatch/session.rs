//! Dispatch session — async owner of a `SearchScreen`.
//!
//! Runs the two deferred callbacks the screen needs (connecting → completed,
//! toast dismissal) on tokio timers and fans screen events out over a
//! broadcast channel. Dropping the session aborts pending timers.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::screen::{DispatchOutcome, SearchOutcome, SearchScreen, Toast};
use crate::config::AppConfig;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Events emitted to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenEvent {
    ToastShown { id: Uuid, message: String },
    ToastDismissed { id: Uuid },
    ConnectingStarted { hospital_ids: Vec<u32> },
    DispatchCompleted { revealed: usize },
}

pub struct DispatchSession {
    screen: Arc<Mutex<SearchScreen>>,
    tx: broadcast::Sender<ScreenEvent>,
    dispatch_delay: Duration,
    toast_duration: Duration,
    connect_timer: Option<JoinHandle<()>>,
    toast_timer: Option<JoinHandle<()>>,
}

impl DispatchSession {
    pub fn new(screen: SearchScreen, config: &AppConfig) -> Self {
        Self::with_timing(screen, config.dispatch_delay, config.toast_duration)
    }

    pub fn with_timing(
        screen: SearchScreen,
        dispatch_delay: Duration,
        toast_duration: Duration,
    ) -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            screen: Arc::new(Mutex::new(screen)),
            tx,
            dispatch_delay,
            toast_duration,
            connect_timer: None,
            toast_timer: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScreenEvent> {
        self.tx.subscribe()
    }

    /// Shared handle to the screen, for readers outliving a single call.
    pub fn shared(&self) -> Arc<Mutex<SearchScreen>> {
        self.screen.clone()
    }

    /// Read the screen under the lock.
    pub async fn view<R>(&self, f: impl FnOnce(&SearchScreen) -> R) -> R {
        let screen = self.screen.lock().await;
        f(&screen)
    }

    /// Run a synchronous screen operation under the lock. A toast raised
    /// inside `f` gets its dismissal scheduled like any other.
    pub async fn with_screen<R>(&mut self, f: impl FnOnce(&mut SearchScreen) -> R) -> R {
        let (result, raised) = {
            let mut screen = self.screen.lock().await;
            let before = screen.toast().map(|t| t.id);
            let result = f(&mut screen);
            let raised = screen.toast().filter(|t| Some(t.id) != before).cloned();
            (result, raised)
        };
        if let Some(toast) = raised {
            self.schedule_dismissal(toast);
        }
        result
    }

    pub async fn submit_search(&mut self) -> SearchOutcome {
        let outcome = self.screen.lock().await.submit_search();
        if let SearchOutcome::Rejected(toast) = &outcome {
            self.schedule_dismissal(toast.clone());
        }
        outcome
    }

    /// Start the simulated call. Completion fires after the dispatch delay.
    pub async fn dispatch(&mut self) -> DispatchOutcome {
        let outcome = self.screen.lock().await.dispatch();
        match &outcome {
            DispatchOutcome::Connecting(ids) => {
                let _ = self.tx.send(ScreenEvent::ConnectingStarted {
                    hospital_ids: ids.clone(),
                });
                self.schedule_completion();
            }
            DispatchOutcome::Rejected(toast) => self.schedule_dismissal(toast.clone()),
            DispatchOutcome::Ignored => {}
        }
        outcome
    }

    /// Show a toast and schedule its dismissal.
    pub async fn show_toast(&mut self, message: &str) -> Toast {
        let toast = self.screen.lock().await.show_toast(message);
        self.schedule_dismissal(toast.clone());
        toast
    }

    fn schedule_completion(&mut self) {
        if let Some(handle) = self.connect_timer.take() {
            handle.abort();
        }
        let screen = self.screen.clone();
        let tx = self.tx.clone();
        let delay = self.dispatch_delay;
        self.connect_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let revealed = screen.lock().await.complete_dispatch();
            info!(revealed, "Connecting finished");
            let _ = tx.send(ScreenEvent::DispatchCompleted { revealed });
        }));
    }

    /// A newer toast replaces the pending dismissal of an older one.
    fn schedule_dismissal(&mut self, toast: Toast) {
        let _ = self.tx.send(ScreenEvent::ToastShown {
            id: toast.id,
            message: toast.message,
        });
        if let Some(handle) = self.toast_timer.take() {
            handle.abort();
        }
        let screen = self.screen.clone();
        let tx = self.tx.clone();
        let duration = self.toast_duration;
        let id = toast.id;
        self.toast_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if screen.lock().await.dismiss_toast(id) {
                debug!(toast = %id, "Toast dismissed");
                let _ = tx.send(ScreenEvent::ToastDismissed { id });
            }
        }));
    }
}

impl Drop for DispatchSession {
    fn drop(&mut self) {
        for handle in [self.connect_timer.take(), self.toast_timer.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchPhase;

    const TICK: Duration = Duration::from_millis(20);

    async fn opened_session() -> DispatchSession {
        let mut session = DispatchSession::with_timing(SearchScreen::default(), TICK, TICK);
        session
            .with_screen(|s| {
                s.set_symptom("복통");
                s.select_patient(1);
            })
            .await;
        assert_eq!(session.submit_search().await, SearchOutcome::Opened);
        session
    }

    #[tokio::test]
    async fn toast_is_dismissed_after_duration() {
        let mut session = DispatchSession::with_timing(SearchScreen::default(), TICK, TICK);
        let mut rx = session.subscribe();

        let SearchOutcome::Rejected(toast) = session.submit_search().await else {
            panic!("expected rejection");
        };
        assert_eq!(
            rx.recv().await.unwrap(),
            ScreenEvent::ToastShown {
                id: toast.id,
                message: toast.message.clone()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ScreenEvent::ToastDismissed { id: toast.id }
        );
        assert!(session.view(|s| s.toast().is_none()).await);
    }

    #[tokio::test]
    async fn toast_raised_inside_screen_operation_is_dismissed() {
        let mut session = DispatchSession::with_timing(SearchScreen::default(), TICK, TICK);
        let mut rx = session.subscribe();

        let outcome = session.with_screen(|s| s.submit_search()).await;
        let SearchOutcome::Rejected(toast) = outcome else {
            panic!("expected rejection");
        };
        assert!(matches!(
            rx.recv().await.unwrap(),
            ScreenEvent::ToastShown { id, .. } if id == toast.id
        ));
        assert_eq!(
            rx.recv().await.unwrap(),
            ScreenEvent::ToastDismissed { id: toast.id }
        );
        assert!(session.view(|s| s.toast().is_none()).await);

        // No new toast, no event.
        session.with_screen(|s| s.set_symptom("두통")).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dispatch_completes_after_delay() {
        let mut session = opened_session().await;
        let mut rx = session.subscribe();
        session.with_screen(|s| s.tap_hospital(1)).await;

        assert_eq!(session.dispatch().await, DispatchOutcome::Connecting(vec![1]));
        assert_eq!(
            rx.recv().await.unwrap(),
            ScreenEvent::ConnectingStarted {
                hospital_ids: vec![1]
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ScreenEvent::DispatchCompleted { revealed: 3 }
        );
        let (phase, count) = session.view(|s| (s.phase(), s.hospitals().len())).await;
        assert_eq!(phase, DispatchPhase::Completed);
        assert_eq!(count, 8);
    }

    #[tokio::test]
    async fn drop_cancels_pending_completion() {
        let mut session = DispatchSession::with_timing(
            SearchScreen::default(),
            Duration::from_millis(50),
            TICK,
        );
        session
            .with_screen(|s| {
                s.set_symptom("어지러움");
                s.select_patient(3);
                s.submit_search();
                s.tap_hospital(5);
            })
            .await;
        session.dispatch().await;
        let screen = session.shared();
        drop(session);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(screen.lock().await.phase(), DispatchPhase::Connecting);
    }
}

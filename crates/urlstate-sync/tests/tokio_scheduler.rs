//! Debounced writes on a real tokio timer, with paused time.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::LocalSet;
use urlstate_sync::{
    MemoryLocation, Scheduler, TokioScheduler, UrlState, UrlStateProvider, UseUrlStateOptions,
};

#[tokio::test(start_paused = true)]
async fn writes_after_debounce_elapses() {
    LocalSet::new()
        .run_until(async {
            let location = MemoryLocation::new("/");
            let scheduler = TokioScheduler::new();
            let provider = UrlStateProvider::new(location.clone(), scheduler.clone());
            let mut hook =
                provider.use_url_state(UrlState::new(), UseUrlStateOptions::debounced(100));

            let (_, set) = hook.render().unwrap();
            set.merge(UrlState::new().with("q", "tokio")).unwrap();
            hook.render().unwrap();
            assert_eq!(scheduler.pending(), 1);

            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(location.href(), "/");

            tokio::time::sleep(Duration::from_millis(60)).await;
            assert_eq!(location.href(), "/?q=tokio");
            assert_eq!(scheduler.pending(), 0);
            assert!(!provider.is_updating());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn cancelled_task_never_runs() {
    LocalSet::new()
        .run_until(async {
            let scheduler = TokioScheduler::new();
            let ran = Rc::new(Cell::new(false));
            let flag = Rc::clone(&ran);
            let id = scheduler.schedule(Duration::from_millis(10), Box::new(move || flag.set(true)));

            assert!(scheduler.cancel(id));
            assert!(!scheduler.cancel(id));

            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(!ran.get());
            assert_eq!(scheduler.pending(), 0);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn dropping_the_hook_cancels_its_write() {
    LocalSet::new()
        .run_until(async {
            let location = MemoryLocation::new("/");
            let scheduler = TokioScheduler::new();
            let provider = UrlStateProvider::new(location.clone(), scheduler.clone());
            let mut hook =
                provider.use_url_state(UrlState::new(), UseUrlStateOptions::debounced(100));

            let (_, set) = hook.render().unwrap();
            set.merge(UrlState::new().with("q", "gone")).unwrap();
            hook.render().unwrap();
            drop(hook);

            tokio::time::sleep(Duration::from_millis(200)).await;
            assert_eq!(location.href(), "/");
            assert_eq!(scheduler.pending(), 0);
        })
        .await;
}

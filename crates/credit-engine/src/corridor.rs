use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::scoring::CorridorScore;

/// Origin/destination country pair the dashboards are looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorridorSelection {
    pub origin: String,
    pub destination: String,
}

impl Default for CorridorSelection {
    fn default() -> Self {
        Self {
            origin: "IN".to_string(),
            destination: "US".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorridorEvent {
    SelectionChanged {
        previous: CorridorSelection,
        current: CorridorSelection,
    },
    ScoreRecorded {
        selection: CorridorSelection,
        score: CorridorScore,
    },
}

/// Receives corridor changes. Called after the state lock is released.
pub trait CorridorObserver: Send + Sync {
    fn notify(&self, event: &CorridorEvent);
}

#[derive(Default)]
struct Inner {
    selection: CorridorSelection,
    last_score: Option<CorridorScore>,
    observers: Vec<Arc<dyn CorridorObserver>>,
}

/// Shared corridor selection plus the most recent corridor score.
#[derive(Default)]
pub struct CorridorState {
    inner: Mutex<Inner>,
}

impl CorridorState {
    pub fn new(selection: CorridorSelection) -> Self {
        Self {
            inner: Mutex::new(Inner {
                selection,
                ..Inner::default()
            }),
        }
    }

    pub fn subscribe(&self, observer: Arc<dyn CorridorObserver>) {
        self.lock().observers.push(observer);
    }

    pub fn selection(&self) -> CorridorSelection {
        self.lock().selection.clone()
    }

    pub fn last_score(&self) -> Option<CorridorScore> {
        self.lock().last_score
    }

    /// Replaces the selection. A new pair clears the stored score; selecting
    /// the current pair again is a no-op and notifies nobody.
    pub fn select(&self, selection: CorridorSelection) -> bool {
        let (event, observers) = {
            let mut inner = self.lock();
            if inner.selection == selection {
                return false;
            }
            let previous = std::mem::replace(&mut inner.selection, selection.clone());
            inner.last_score = None;
            (
                CorridorEvent::SelectionChanged {
                    previous,
                    current: selection,
                },
                inner.observers.clone(),
            )
        };

        dispatch(&observers, &event);
        true
    }

    /// Stores `score` and returns the selection it was recorded against.
    pub fn record_score(&self, score: CorridorScore) -> CorridorSelection {
        let (selection, observers) = {
            let mut inner = self.lock();
            inner.last_score = Some(score);
            (inner.selection.clone(), inner.observers.clone())
        };

        dispatch(
            &observers,
            &CorridorEvent::ScoreRecorded {
                selection: selection.clone(),
                score,
            },
        );
        selection
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn dispatch(observers: &[Arc<dyn CorridorObserver>], event: &CorridorEvent) {
    for observer in observers {
        observer.notify(event);
    }
}

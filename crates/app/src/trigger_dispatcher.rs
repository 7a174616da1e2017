//! Trigger dispatcher: routes scene events to attached device triggers.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use zonelight_domain::event::SceneEvent;
use zonelight_domain::trigger::DeviceTrigger;

type Attachment = (DeviceTrigger, mpsc::UnboundedSender<SceneEvent>);

/// Listens on the event bus and forwards every matching event to the
/// channel of each attached trigger.
///
/// Dropping a receiver returned by [`attach`](Self::attach) detaches it.
pub struct TriggerDispatcher {
    attachments: Arc<Mutex<Vec<Attachment>>>,
    task: JoinHandle<()>,
}

impl TriggerDispatcher {
    /// Start dispatching events received on `events`.
    #[must_use]
    pub fn spawn(mut events: broadcast::Receiver<SceneEvent>) -> Self {
        let attachments: Arc<Mutex<Vec<Attachment>>> = Arc::default();
        let shared = Arc::clone(&attachments);
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => dispatch(&shared, &event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "trigger dispatcher lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Self { attachments, task }
    }

    /// Attach a trigger and receive the events it matches.
    #[must_use]
    pub fn attach(&self, trigger: DeviceTrigger) -> mpsc::UnboundedReceiver<SceneEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        tracing::debug!(trigger = %trigger, "trigger attached");
        self.lock().push((trigger, tx));
        rx
    }

    /// Number of triggers still attached.
    #[must_use]
    pub fn attached(&self) -> usize {
        let mut attachments = self.lock();
        attachments.retain(|(_, tx)| !tx.is_closed());
        attachments.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Attachment>> {
        self.attachments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TriggerDispatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn dispatch(attachments: &Mutex<Vec<Attachment>>, event: &SceneEvent) {
    let mut attachments = attachments.lock().unwrap_or_else(PoisonError::into_inner);
    attachments.retain(|(_, tx)| !tx.is_closed());
    for (trigger, tx) in attachments.iter() {
        if trigger.matches_event(event) {
            tracing::debug!(trigger = %trigger, "trigger fired");
            let _ = tx.send(event.clone());
        }
    }
}

//! Shared state between handlers.

use ::std::sync::Arc;

use ::tokio::sync::Mutex;

use crate::executor::PinSender;
use crate::scheduler::Scheduler;

pub(crate) struct AppState<K, E> {
    /// Held for the whole handling of a control request.
    scheduler: Arc<Mutex<Scheduler<K, E>>>,
    /// Pin replies never take the scheduler lock,
    /// they arrive while a DAG creation holds it.
    pin_sender: PinSender,
}

impl<K, E> Clone for AppState<K, E> {
    fn clone(&self) -> Self {
        Self {
            scheduler: Arc::clone(&self.scheduler),
            pin_sender: self.pin_sender.clone(),
        }
    }
}

impl<K, E> AppState<K, E> {
    pub(crate) fn new(scheduler: Scheduler<K, E>, pin_sender: PinSender) -> Self {
        Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            pin_sender,
        }
    }

    pub(crate) fn get_scheduler(&self) -> &Mutex<Scheduler<K, E>> {
        &self.scheduler
    }

    pub(crate) fn get_pin_sender(&self) -> &PinSender {
        &self.pin_sender
    }
}

//! Talking to executors: pin requests out, pin replies back in.

pub mod http_client;

use ::core::future::Future;
use ::std::time::Duration;

use ::cirrus_common::{
    error::Result,
    executor::{ExecutorLocation, PinResponse},
};
use ::tokio::{
    sync::mpsc::{self, error::TryRecvError},
    time::{sleep_until, timeout_at, Instant},
};
use ::tracing::{error, warn};

/// Capacity of the pin acceptance channel.
const PIN_CHANNEL_CAPACITY: usize = 1024;

/// Requests sent by the scheduler to executor slots.
/// Replies to pin requests do not come back through this trait,
/// executors deliver them asynchronously to the [PinAcceptor].
pub trait ExecutorClient: Send + Sync + 'static {
    /// Ask `location` to pin a function. `message` is `<requester-ip>:<function>`.
    /// # Return
    /// - `Ok(())` if the request is delivered.
    /// - `Err(_)` if the executor cannot be reached.
    fn send_pin(
        &self,
        location: &ExecutorLocation,
        message: String,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Ask `location` to unpin `function`. Best effort, nothing is awaited.
    fn send_unpin(&self, location: &ExecutorLocation, function: &str);
}

/// Sending half of the pin acceptance channel, fed by executor replies.
pub type PinSender = mpsc::Sender<PinResponse>;

/// Receiving half of the pin acceptance channel.
/// There is one per scheduler, shared by every pin request it makes.
pub struct PinAcceptor {
    receiver: mpsc::Receiver<PinResponse>,
}

impl PinAcceptor {
    pub fn channel() -> (PinSender, Self) {
        let (sender, receiver) = mpsc::channel(PIN_CHANNEL_CAPACITY);
        (sender, Self { receiver })
    }

    /// Drop replies nobody waits for, e.g. late answers to timed-out requests.
    pub(crate) fn discard_pending(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(response) => warn!(
                    "Discard unexpected pin response from {} (success: {})",
                    response.location, response.success
                ),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return,
            }
        }
    }

    /// Wait for the reply of `location`.
    /// # Return
    /// - `Some(true)` if the pin is accepted.
    /// - `Some(false)` if the pin is rejected.
    /// - `None` if no reply arrives within `timeout`.
    pub(crate) async fn wait_for(
        &mut self,
        location: &ExecutorLocation,
        timeout: Duration,
    ) -> Option<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            match timeout_at(deadline, self.receiver.recv()).await {
                Ok(Some(response)) if &response.location == location => {
                    return Some(response.success)
                }
                Ok(Some(response)) => {
                    warn!(
                        "Discard pin response from {} while waiting for {}",
                        response.location, location
                    );
                }
                Ok(None) => {
                    error!("Pin acceptance channel is closed");
                    sleep_until(deadline).await;
                    return None;
                }
                Err(_) => return None,
            }
        }
    }
}

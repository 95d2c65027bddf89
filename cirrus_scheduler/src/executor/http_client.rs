use ::std::time::Duration;

use ::cirrus_common::{
    error::{CirrusError, Result},
    executor::{ExecutorLocation, PIN_PORT, UNPIN_PORT},
};
use ::tracing::{debug, warn};

use super::ExecutorClient;

/// Reach executors over HTTP.
/// Slot `n` of a node listens for pins on `pin_port + n` and for unpins on `unpin_port + n`.
/// Every request gives up after `request_timeout`.
#[derive(Clone)]
pub struct HttpExecutorClient {
    client: reqwest::Client,
    pin_port: u16,
    unpin_port: u16,
}

impl HttpExecutorClient {
    pub fn new(pin_port: u16, unpin_port: u16, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(CirrusError::fail_to_start_server)?;
        Ok(Self {
            client,
            pin_port,
            unpin_port,
        })
    }

    /// Client of executors listening on [PIN_PORT] and [UNPIN_PORT].
    pub fn with_timeout(request_timeout: Duration) -> Result<Self> {
        Self::new(PIN_PORT, UNPIN_PORT, request_timeout)
    }
}

impl ExecutorClient for HttpExecutorClient {
    async fn send_pin(&self, location: &ExecutorLocation, message: String) -> Result<()> {
        let address = location.pin_address(self.pin_port);
        debug!("Send pin request {} to {}", message, address);
        match self
            .client
            .post(&address)
            .body(message)
            .send()
            .await
            .and_then(|response| response.error_for_status())
        {
            Ok(_) => Ok(()),
            // a slow executor may still have the request, its reply is awaited as usual
            Err(e) if e.is_timeout() => {
                warn!("Pin request to {} is not acknowledged in time", address);
                Ok(())
            }
            Err(e) => Err(CirrusError::fail_to_contact_executor(e)),
        }
    }

    fn send_unpin(&self, location: &ExecutorLocation, function: &str) {
        let request = self
            .client
            .post(location.unpin_address(self.unpin_port))
            .body(function.to_owned());
        let location = location.clone();
        let function = function.to_owned();
        tokio::spawn(async move {
            if let Err(e) = request.send().await {
                warn!("Failed to unpin {} from {}: {}", function, location, e);
            }
        });
    }
}

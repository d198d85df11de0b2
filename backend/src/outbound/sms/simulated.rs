//! Provider used when no carrier is configured.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    OutboundSms, ProviderMode, ProviderReceipt, SmsProvider, SmsProviderError,
};

/// Delay before a simulated message reports `sent`.
pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(1000);

/// Accepts every message without sending it.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedSmsProvider {
    settle_after: Duration,
}

impl SimulatedSmsProvider {
    /// Simulator whose messages settle after `settle_after`.
    pub fn new(settle_after: Duration) -> Self {
        Self { settle_after }
    }
}

impl Default for SimulatedSmsProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_DELAY)
    }
}

#[async_trait]
impl SmsProvider for SimulatedSmsProvider {
    async fn send(&self, sms: &OutboundSms) -> Result<ProviderReceipt, SmsProviderError> {
        debug!(to = %sms.to.masked(), chars = sms.body.as_str().chars().count(), "simulating delivery");
        Ok(ProviderReceipt::Simulated {
            settle_after: self.settle_after,
        })
    }

    fn mode(&self) -> ProviderMode {
        ProviderMode::Simulated
    }
}

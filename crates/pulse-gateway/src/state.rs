//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use pulse_sync::CommandSync;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
///
/// This struct holds references to all services needed by the HTTP handlers.
pub struct GatewayState<C>
where
    C: CommandSync,
{
    /// The sync façade for command and client operations.
    pub sync: Arc<C>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<C> GatewayState<C>
where
    C: CommandSync,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(sync: Arc<C>, config: GatewayConfig) -> Self {
        Self { sync, config }
    }
}

impl<C> Clone for GatewayState<C>
where
    C: CommandSync,
{
    fn clone(&self) -> Self {
        Self {
            sync: Arc::clone(&self.sync),
            config: self.config.clone(),
        }
    }
}

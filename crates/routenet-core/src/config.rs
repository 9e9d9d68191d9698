//! Reconciliation configuration
//!
//! An explicit immutable value handed to each component constructor. There
//! is no ambient or global configuration lookup anywhere in the engine.

use crate::error::{Result, RouteNetError};

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationConfig {
    /// Minimum distance below which two features are treated as coincident,
    /// and the snap distance for geometry cleanup
    pub tolerance: f64,
    /// Snap a new segment's endpoints onto an existing node within tolerance
    pub enable_segment_ends_auto_snapping_to_route_node: bool,
    /// Emit a geographical-area-updated notification after each applied edit
    pub send_geographical_area_updated_notification: bool,
    /// Name this application reports in edit provenance
    pub application_name: String,
    /// Host of the API gateway used by external-service ports
    pub api_gateway_host: String,
    /// How many times a concurrency conflict triggers a full re-run
    pub max_conflict_retries: u32,
    /// Bounded-concurrency permits for the reconciliation gate
    pub gate_permits: usize,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            enable_segment_ends_auto_snapping_to_route_node: true,
            send_geographical_area_updated_notification: false,
            application_name: "routenet".to_string(),
            api_gateway_host: "localhost".to_string(),
            max_conflict_retries: 5,
            gate_permits: 1,
        }
    }
}

impl ReconciliationConfig {
    pub fn builder() -> ReconciliationConfigBuilder {
        ReconciliationConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(RouteNetError::config(format!(
                "tolerance must be a positive finite number, got {}",
                self.tolerance
            )));
        }
        if self.gate_permits == 0 {
            return Err(RouteNetError::config("gate_permits must be at least 1"));
        }
        if self.application_name.is_empty() {
            return Err(RouteNetError::config("application_name cannot be empty"));
        }
        Ok(())
    }
}

/// Builder for [`ReconciliationConfig`].
#[derive(Debug, Default)]
pub struct ReconciliationConfigBuilder {
    config: ReconciliationConfig,
}

impl ReconciliationConfigBuilder {
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn auto_snap_segment_ends(mut self, enabled: bool) -> Self {
        self.config.enable_segment_ends_auto_snapping_to_route_node = enabled;
        self
    }

    pub fn send_area_updated_notification(mut self, enabled: bool) -> Self {
        self.config.send_geographical_area_updated_notification = enabled;
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.config.application_name = name.into();
        self
    }

    pub fn api_gateway_host(mut self, host: impl Into<String>) -> Self {
        self.config.api_gateway_host = host.into();
        self
    }

    pub fn max_conflict_retries(mut self, retries: u32) -> Self {
        self.config.max_conflict_retries = retries;
        self
    }

    pub fn gate_permits(mut self, permits: usize) -> Self {
        self.config.gate_permits = permits;
        self
    }

    pub fn build(self) -> Result<ReconciliationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

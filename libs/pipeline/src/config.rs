//! Pipeline configuration
//!
//! Read-only settings consumed once at pipeline construction. There is no
//! way to change a built pipeline afterwards; reconfiguration means building
//! a new one.

use cuprum_models::ExpressionDialect;
use serde::{Deserialize, Serialize};

/// Agent-wide pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Expression dialect used when a device type does not declare one.
    #[serde(rename = "expressionLanguage", default)]
    pub default_dialect: ExpressionDialect,
    /// Whether the timestamp transforms (compression and `TimeInstant`
    /// propagation) are registered at all.
    #[serde(default = "default_timestamp")]
    pub timestamp: bool,
}

fn default_timestamp() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_dialect: ExpressionDialect::default(),
            timestamp: true,
        }
    }
}

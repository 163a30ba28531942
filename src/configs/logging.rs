use serde::{Deserialize, Serialize};

/// `[logging]` table. Both fields feed the tracing `EnvFilter`;
/// `RUST_LOG` overrides them when set.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct LoggingConfig {
    /// Base level, e.g. `"info"` or `"debug"`.
    pub level: Option<String>,
    /// Extra comma-separated directives, e.g. `"symphonia=warn"`.
    pub filters: Option<String>,
}

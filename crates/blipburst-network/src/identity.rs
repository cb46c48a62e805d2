use serde::{Deserialize, Serialize};

/// How the HTTP caller presents itself and how long it waits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallerIdentity {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Whole-request timeout. `None` leaves reqwest's default (no timeout).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for CallerIdentity {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: None,
        }
    }
}

fn default_user_agent() -> String {
    format!("blipburst/{}", env!("CARGO_PKG_VERSION"))
}

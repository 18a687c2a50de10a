use serde::{Deserialize, Serialize};

/// A dashboard button as configured and as served to the front-end.
/// This is the canonical data model used by the panel daemon and its API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Button {
    /// Text shown on the button
    pub label: String,

    /// API endpoint the front-end posts to when pressed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Display value; may contain placeholders like "{cpu}" that are
    /// substituted with live metrics when the list is served
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// How the button's toggle state is resolved, if it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle: Option<ButtonToggle>,

    /// Resolved toggle state, filled in when the list is served
    #[serde(
        default,
        rename = "toggleState",
        skip_serializing_if = "Option::is_none"
    )]
    pub toggle_state: Option<bool>,
}

/// Source of a button's toggle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ButtonToggle {
    /// Mirrors the runtime maintenance flag
    Maintenance,
    /// Live reachability of a target (address or hostname/URL)
    Online { target: String },
}

/// Host metrics snapshot. Field names follow the dashboard's JSON contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    /// CPU usage as an integer percentage
    pub cpu_usage: u64,

    /// RAM usage as an integer percentage
    pub ram_usage: u64,

    /// Total RAM, e.g. "16GB"
    pub ram_total: String,

    /// Used RAM, e.g. "10.4GB"
    pub ram_used: String,
}

/// State of a background wake-confirmation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WakeJobStatus {
    /// Wake signal sent, polling not yet started
    Signaled,
    /// Blocked on one target of the poll plan
    Waiting { target: String, attempts: u32 },
    /// Every target in the plan reported reachable
    Done,
    /// Configured maximum wait elapsed before the plan completed
    TimedOut,
    /// Daemon shut down while the job was still polling
    Cancelled,
}

impl WakeJobStatus {
    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::TimedOut | Self::Cancelled)
    }
}

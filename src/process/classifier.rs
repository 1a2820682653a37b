//! Ownership and priority classification of processes.
//!
//! A process belongs to the monitored application when it is the caller
//! itself, or when its command name contains the application marker.

/// Marker matched against command names by default.
pub const DEFAULT_APP_MARKER: &str = "boinc";

/// Kernel priority reported for niceness 19.
///
/// Linux stores priority as nice + 20 so that negative values stay free for
/// error codes; the lowest user-visible niceness therefore reads as 39.
pub const LOW_PRIORITY_SENTINEL: i64 = 39;

pub fn is_low_priority(priority: i64) -> bool {
    priority == LOW_PRIORITY_SENTINEL
}

/// Decides whether a process belongs to the monitored application.
#[derive(Debug, Clone)]
pub struct OwnershipClassifier {
    own_pid: u32,
    /// Stored lowercased.
    marker: String,
}

impl OwnershipClassifier {
    pub fn new(own_pid: u32, marker: &str) -> Self {
        Self {
            own_pid,
            marker: marker.to_ascii_lowercase(),
        }
    }

    /// Classifier for the calling process.
    pub fn for_current_process(marker: &str) -> Self {
        Self::new(std::process::id(), marker)
    }

    pub fn own_pid(&self) -> u32 {
        self.own_pid
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn is_owned(&self, pid: u32, command: &str) -> bool {
        if pid == self.own_pid {
            return true;
        }
        if self.marker.is_empty() {
            return false;
        }
        command.to_ascii_lowercase().contains(&self.marker)
    }
}

impl Default for OwnershipClassifier {
    fn default() -> Self {
        Self::for_current_process(DEFAULT_APP_MARKER)
    }
}

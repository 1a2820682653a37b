//! Conversion of kernel-native units into bytes and seconds.
//!
//! Text status records report resident memory in pages and CPU time in clock
//! ticks; binary records report sizes in KB and times as (sec, nsec) pairs.

use once_cell::sync::Lazy;

/// Fallback when sysconf cannot report the page size.
pub const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Historical USER_HZ; still what Linux exposes through /proc.
pub const DEFAULT_TICKS_PER_SECOND: f64 = 100.0;

/// Positive `sysconf` value for `name`, or `None` when unavailable.
fn sysconf(name: libc::c_int) -> Option<i64> {
    // SAFETY: sysconf takes no pointers; -1 and 0 are both rejected below
    let value = i64::from(unsafe { libc::sysconf(name) });
    (value > 0).then_some(value)
}

static DETECTED: Lazy<Units> = Lazy::new(|| Units {
    page_size: sysconf(libc::_SC_PAGESIZE).map_or(DEFAULT_PAGE_SIZE, |v| v as u64),
    ticks_per_second: sysconf(libc::_SC_CLK_TCK).map_or(DEFAULT_TICKS_PER_SECOND, |v| v as f64),
});

/// Unit constants used to normalize one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    pub page_size: u64,
    pub ticks_per_second: f64,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
        }
    }
}

impl Units {
    /// Units reported by the running system, queried once per process.
    pub fn detect() -> Self {
        *DETECTED
    }

    /// Resident page count to bytes. Negative counts clamp to zero.
    pub fn pages_to_bytes(&self, pages: i64) -> u64 {
        u64::try_from(pages)
            .unwrap_or(0)
            .saturating_mul(self.page_size)
    }

    pub fn ticks_to_seconds(&self, ticks: u64) -> f64 {
        ticks as f64 / self.ticks_per_second
    }
}

pub fn kib_to_bytes(kib: u64) -> u64 {
    kib.saturating_mul(1024)
}

/// Seconds plus nanoseconds as fractional seconds.
pub fn timespec_to_seconds(sec: i64, nsec: i64) -> f64 {
    sec as f64 + nsec as f64 / 1e9
}

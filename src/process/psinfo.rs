//! Decoders for the binary `/proc/<pid>/psinfo` and `/proc/<pid>/usage`
//! records exposed by Solaris and illumos.
//!
//! Only the LP64 layouts of `psinfo_t` and `prusage_t` are understood. The
//! records are read at their full fixed size and fields are picked from
//! explicit offsets, so a layout mismatch shows up as a short record rather
//! than as silently shifted values.

use crate::error::ProcError;
use crate::process::table::bounded_command;

/// `sizeof(psinfo_t)` on LP64.
pub const PSINFO_RECORD_LEN: usize = 416;
/// `sizeof(prusage_t)` on LP64.
pub const USAGE_RECORD_LEN: usize = 504;

const PR_FNAMESZ: usize = 16;

mod psinfo_offsets {
    pub const PID: usize = 8;
    pub const PPID: usize = 12;
    /// Image size in KB.
    pub const SIZE: usize = 48;
    /// Resident set size in KB.
    pub const RSSIZE: usize = 56;
    pub const FNAME: usize = 136;
}

mod usage_offsets {
    pub const UTIME: usize = 72;
    pub const STIME: usize = 88;
    pub const MINF: usize = 328;
    pub const MAJF: usize = 336;
}

/// Identification and size fields of `psinfo_t`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PsInfo {
    pub pid: i32,
    pub ppid: i32,
    pub size_kb: u64,
    pub rssize_kb: u64,
    pub fname: String,
}

/// A `timestruc_t`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timestruc {
    pub sec: i64,
    pub nsec: i64,
}

/// Timing and fault fields of `prusage_t`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrUsage {
    pub utime: Timestruc,
    pub stime: Timestruc,
    pub minf: u64,
    pub majf: u64,
}

fn short_record(what: &str, want: usize, got: usize) -> ProcError {
    ProcError::RecordUnreadable {
        pid: 0,
        opened: true,
        source: std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("{what} record is {got} bytes, expected {want}"),
        ),
    }
}

fn array<const N: usize>(buf: &[u8], off: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[off..off + N]);
    out
}

fn read_i32(buf: &[u8], off: usize) -> i32 {
    i32::from_ne_bytes(array(buf, off))
}

fn read_i64(buf: &[u8], off: usize) -> i64 {
    i64::from_ne_bytes(array(buf, off))
}

fn read_u64(buf: &[u8], off: usize) -> u64 {
    u64::from_ne_bytes(array(buf, off))
}

fn read_timestruc(buf: &[u8], off: usize) -> Timestruc {
    Timestruc {
        sec: read_i64(buf, off),
        nsec: read_i64(buf, off + 8),
    }
}

impl PsInfo {
    pub fn decode(buf: &[u8]) -> Result<Self, ProcError> {
        if buf.len() < PSINFO_RECORD_LEN {
            return Err(short_record("psinfo", PSINFO_RECORD_LEN, buf.len()));
        }
        use psinfo_offsets::*;
        let raw = &buf[FNAME..FNAME + PR_FNAMESZ];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(PR_FNAMESZ);
        Ok(Self {
            pid: read_i32(buf, PID),
            ppid: read_i32(buf, PPID),
            size_kb: read_u64(buf, SIZE),
            rssize_kb: read_u64(buf, RSSIZE),
            fname: bounded_command(&String::from_utf8_lossy(&raw[..end])),
        })
    }
}

impl PrUsage {
    pub fn decode(buf: &[u8]) -> Result<Self, ProcError> {
        if buf.len() < USAGE_RECORD_LEN {
            return Err(short_record("usage", USAGE_RECORD_LEN, buf.len()));
        }
        use usage_offsets::*;
        Ok(Self {
            utime: read_timestruc(buf, UTIME),
            stime: read_timestruc(buf, STIME),
            minf: read_u64(buf, MINF),
            majf: read_u64(buf, MAJF),
        })
    }
}

/// Record builders shared with the source tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn psinfo_bytes(pid: i32, ppid: i32, size_kb: u64, rssize_kb: u64, fname: &str) -> Vec<u8> {
        use super::psinfo_offsets::*;
        let mut buf = vec![0u8; PSINFO_RECORD_LEN];
        buf[PID..PID + 4].copy_from_slice(&pid.to_ne_bytes());
        buf[PPID..PPID + 4].copy_from_slice(&ppid.to_ne_bytes());
        buf[SIZE..SIZE + 8].copy_from_slice(&size_kb.to_ne_bytes());
        buf[RSSIZE..RSSIZE + 8].copy_from_slice(&rssize_kb.to_ne_bytes());
        let name = fname.as_bytes();
        let n = name.len().min(PR_FNAMESZ);
        buf[FNAME..FNAME + n].copy_from_slice(&name[..n]);
        buf
    }

    pub fn usage_bytes(utime: (i64, i64), stime: (i64, i64), minf: u64, majf: u64) -> Vec<u8> {
        use super::usage_offsets::*;
        let mut buf = vec![0u8; USAGE_RECORD_LEN];
        buf[UTIME..UTIME + 8].copy_from_slice(&utime.0.to_ne_bytes());
        buf[UTIME + 8..UTIME + 16].copy_from_slice(&utime.1.to_ne_bytes());
        buf[STIME..STIME + 8].copy_from_slice(&stime.0.to_ne_bytes());
        buf[STIME + 8..STIME + 16].copy_from_slice(&stime.1.to_ne_bytes());
        buf[MINF..MINF + 8].copy_from_slice(&minf.to_ne_bytes());
        buf[MAJF..MAJF + 8].copy_from_slice(&majf.to_ne_bytes());
        buf
    }
}

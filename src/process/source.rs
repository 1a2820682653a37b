//! Per-process status sources.
//!
//! A `StatusSource` reads and normalizes the status record of one process
//! directory. Linux exposes a text `stat` line; Solaris and illumos expose
//! binary `psinfo` and `usage` records. `NativeSource` picks the variant for
//! the build target, but both are available everywhere so that fixture
//! trees of either layout can be decoded.

use crate::error::ProcError;
use crate::process::classifier::{is_low_priority, OwnershipClassifier};
use crate::process::psinfo::{PrUsage, PsInfo, PSINFO_RECORD_LEN, USAGE_RECORD_LEN};
use crate::process::stat::{parse_stat_line, ProcStat};
use crate::process::table::ProcessInfo;
use crate::process::units::{kib_to_bytes, timespec_to_seconds, Units};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Reads and normalizes the status of one process.
pub trait StatusSource {
    /// `pid_dir` is the process's directory under the proc root, `pid` the
    /// identifier it was listed under.
    fn read_process(&self, pid_dir: &Path, pid: u32) -> Result<ProcessInfo, ProcError>;
}

#[cfg(any(target_os = "solaris", target_os = "illumos"))]
pub type NativeSource = PsinfoSource;

#[cfg(not(any(target_os = "solaris", target_os = "illumos")))]
pub type NativeSource = StatFileSource;

fn open_record(path: &Path, pid: u32) -> Result<File, ProcError> {
    File::open(path).map_err(|source| ProcError::RecordUnreadable {
        pid,
        opened: false,
        source,
    })
}

fn unreadable(pid: u32, source: std::io::Error) -> ProcError {
    ProcError::RecordUnreadable {
        pid,
        opened: true,
        source,
    }
}

/// Text `stat` line source used on Linux.
#[derive(Debug, Clone)]
pub struct StatFileSource {
    units: Units,
    classifier: OwnershipClassifier,
}

impl StatFileSource {
    pub fn new(units: Units, classifier: OwnershipClassifier) -> Self {
        Self { units, classifier }
    }

    /// Reads the first line of `<pid_dir>/stat`.
    fn read_line(&self, pid_dir: &Path, pid: u32) -> Result<String, ProcError> {
        let file = open_record(&pid_dir.join("stat"), pid)?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| unreadable(pid, e))?;
        if n == 0 {
            return Err(unreadable(
                pid,
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "empty stat record"),
            ));
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Converts a parsed record into bytes, seconds and classification flags.
    pub fn normalize(&self, stat: &ProcStat) -> Result<ProcessInfo, ProcError> {
        let id = u32::try_from(stat.pid)
            .map_err(|_| ProcError::malformed(format!("negative pid {}", stat.pid)))?;
        let parent_id = u32::try_from(stat.ppid)
            .map_err(|_| ProcError::malformed(format!("parent pid {} out of range", stat.ppid)))?;
        Ok(ProcessInfo {
            id,
            parent_id,
            command: stat.comm.clone(),
            swap_size: stat.vsize,
            working_set_size: self.units.pages_to_bytes(stat.rss),
            user_time: self.units.ticks_to_seconds(stat.utime),
            kernel_time: self.units.ticks_to_seconds(stat.stime),
            page_fault_count: stat.minflt.saturating_add(stat.majflt),
            is_owned_by_monitored_app: self.classifier.is_owned(id, &stat.comm),
            is_low_priority: is_low_priority(stat.priority),
            children: Vec::new(),
        })
    }
}

impl StatusSource for StatFileSource {
    fn read_process(&self, pid_dir: &Path, pid: u32) -> Result<ProcessInfo, ProcError> {
        let line = self.read_line(pid_dir, pid)?;
        parse_stat_line(&line)
            .and_then(|stat| self.normalize(&stat))
            .map_err(|e| e.with_pid(pid))
    }
}

/// Binary `psinfo` + `usage` source used on Solaris and illumos.
#[derive(Debug, Clone)]
pub struct PsinfoSource {
    classifier: OwnershipClassifier,
}

impl PsinfoSource {
    pub fn new(classifier: OwnershipClassifier) -> Self {
        Self { classifier }
    }

    /// Reads up to `len` bytes; the decoder rejects anything shorter.
    fn read_record(path: &Path, pid: u32, len: usize) -> Result<Vec<u8>, ProcError> {
        let file = open_record(path, pid)?;
        let mut buf = Vec::with_capacity(len);
        file.take(len as u64)
            .read_to_end(&mut buf)
            .map_err(|e| unreadable(pid, e))?;
        Ok(buf)
    }

    pub fn normalize(&self, info: &PsInfo, usage: &PrUsage) -> Result<ProcessInfo, ProcError> {
        let id = u32::try_from(info.pid)
            .map_err(|_| ProcError::malformed(format!("negative pid {}", info.pid)))?;
        let parent_id = u32::try_from(info.ppid)
            .map_err(|_| ProcError::malformed(format!("negative parent pid {}", info.ppid)))?;
        Ok(ProcessInfo {
            id,
            parent_id,
            command: info.fname.clone(),
            swap_size: kib_to_bytes(info.size_kb),
            working_set_size: kib_to_bytes(info.rssize_kb),
            user_time: timespec_to_seconds(usage.utime.sec, usage.utime.nsec),
            kernel_time: timespec_to_seconds(usage.stime.sec, usage.stime.nsec),
            page_fault_count: usage.majf.saturating_add(usage.minf),
            is_owned_by_monitored_app: self.classifier.is_owned(id, &info.fname),
            is_low_priority: false,
            children: Vec::new(),
        })
    }
}

impl StatusSource for PsinfoSource {
    fn read_process(&self, pid_dir: &Path, pid: u32) -> Result<ProcessInfo, ProcError> {
        let decode = || -> Result<ProcessInfo, ProcError> {
            let raw = Self::read_record(&pid_dir.join("psinfo"), pid, PSINFO_RECORD_LEN)?;
            let info = PsInfo::decode(&raw)?;
            let raw = Self::read_record(&pid_dir.join("usage"), pid, USAGE_RECORD_LEN)?;
            let usage = PrUsage::decode(&raw)?;
            self.normalize(&info, &usage)
        };
        decode().map_err(|e| e.with_pid(pid))
    }
}

//! Parser for Linux `/proc/<pid>/stat` lines.
//!
//! Field order follows `fs/proc/array.c`. The command name is the
//! executable's base name truncated by the kernel to 15 characters, but it
//! may itself contain spaces and parentheses, so it is delimited by the
//! first `(` and the *last* `)` on the line.

use crate::error::ProcError;
use crate::process::table::bounded_command;
use std::str::FromStr;

/// Number of leading fields a stat line must carry.
pub const STAT_FIELD_COUNT: usize = 39;

/// Raw fields of one `/proc/<pid>/stat` record, in kernel order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStat {
    pub pid: i32,
    pub comm: String,
    pub state: char,
    pub ppid: i64,
    pub pgrp: i64,
    pub session: i64,
    pub tty_nr: i64,
    pub tpgid: i64,
    pub flags: u64,
    pub minflt: u64,
    pub cminflt: u64,
    pub majflt: u64,
    pub cmajflt: u64,
    pub utime: u64,
    pub stime: u64,
    pub cutime: i64,
    pub cstime: i64,
    pub priority: i64,
    pub nice: i64,
    /// Reported as a hard-coded zero before 2.6, thread count since.
    pub num_threads: i64,
    pub itrealvalue: i64,
    pub starttime: u64,
    pub vsize: u64,
    /// Resident set size in pages.
    pub rss: i64,
    pub rsslim: u64,
    pub startcode: u64,
    pub endcode: u64,
    pub startstack: u64,
    pub kstkesp: u64,
    pub kstkeip: u64,
    pub signal: u64,
    pub blocked: u64,
    pub sigignore: u64,
    pub sigcatch: u64,
    pub wchan: u64,
    pub nswap: u64,
    pub cnswap: u64,
    pub exit_signal: i64,
    pub processor: i64,
}

/// Sequential reader over the whitespace-separated fields after the command.
struct Fields<'a> {
    iter: std::str::SplitWhitespace<'a>,
    /// 1-based position of the next field in the full record.
    position: usize,
}

impl<'a> Fields<'a> {
    fn new(rest: &'a str) -> Self {
        Self {
            iter: rest.split_whitespace(),
            // pid and comm are already consumed
            position: 3,
        }
    }

    fn raw(&mut self, name: &str) -> Result<&'a str, ProcError> {
        let tok = self.iter.next().ok_or_else(|| {
            ProcError::malformed(format!(
                "expected {} fields, found {} (missing {})",
                STAT_FIELD_COUNT,
                self.position - 1,
                name
            ))
        })?;
        self.position += 1;
        Ok(tok)
    }

    fn next<T: FromStr>(&mut self, name: &str) -> Result<T, ProcError> {
        let position = self.position;
        let tok = self.raw(name)?;
        tok.parse().map_err(|_| {
            ProcError::malformed(format!(
                "field {} ({}) is not a valid {}: {:?}",
                position,
                name,
                std::any::type_name::<T>(),
                tok
            ))
        })
    }

    fn state(&mut self) -> Result<char, ProcError> {
        let tok = self.raw("state")?;
        let mut chars = tok.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ProcError::malformed(format!(
                "field 3 (state) is not a single character: {:?}",
                tok
            ))),
        }
    }
}

/// Parses one stat line into its 39 typed fields.
///
/// Anything beyond the 39th field is ignored; newer kernels append more.
pub fn parse_stat_line(line: &str) -> Result<ProcStat, ProcError> {
    let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');

    let open = line
        .find('(')
        .ok_or_else(|| ProcError::malformed("missing '(' before command name"))?;
    let close = line
        .rfind(')')
        .filter(|&close| close > open)
        .ok_or_else(|| ProcError::malformed("missing ')' after command name"))?;

    let pid_str = line[..open].trim();
    let pid: i32 = pid_str
        .parse()
        .map_err(|_| ProcError::malformed(format!("field 1 (pid) is not a number: {pid_str:?}")))?;
    let comm = bounded_command(&line[open + 1..close]);

    let mut f = Fields::new(&line[close + 1..]);
    Ok(ProcStat {
        pid,
        comm,
        state: f.state()?,
        ppid: f.next("ppid")?,
        pgrp: f.next("pgrp")?,
        session: f.next("session")?,
        tty_nr: f.next("tty_nr")?,
        tpgid: f.next("tpgid")?,
        flags: f.next("flags")?,
        minflt: f.next("minflt")?,
        cminflt: f.next("cminflt")?,
        majflt: f.next("majflt")?,
        cmajflt: f.next("cmajflt")?,
        utime: f.next("utime")?,
        stime: f.next("stime")?,
        cutime: f.next("cutime")?,
        cstime: f.next("cstime")?,
        priority: f.next("priority")?,
        nice: f.next("nice")?,
        num_threads: f.next("num_threads")?,
        itrealvalue: f.next("itrealvalue")?,
        starttime: f.next("starttime")?,
        vsize: f.next("vsize")?,
        rss: f.next("rss")?,
        rsslim: f.next("rsslim")?,
        startcode: f.next("startcode")?,
        endcode: f.next("endcode")?,
        startstack: f.next("startstack")?,
        kstkesp: f.next("kstkesp")?,
        kstkeip: f.next("kstkeip")?,
        signal: f.next("signal")?,
        blocked: f.next("blocked")?,
        sigignore: f.next("sigignore")?,
        sigcatch: f.next("sigcatch")?,
        wchan: f.next("wchan")?,
        nswap: f.next("nswap")?,
        cnswap: f.next("cnswap")?,
        exit_signal: f.next("exit_signal")?,
        processor: f.next("processor")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Fields 3..=52 of a real 6.x kernel stat line for a sleeping process.
    const TAIL: &str = "S 1 1234 1234 0 -1 4194304 100 0 7 0 250 120 0 0 20 0 1 0 12345 12345678 300 18446744073709551615 4194304 4238788 140736466511168 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0 0 0 0 0 0 0 0 0";

    fn line(comm: &str) -> String {
        format!("1234 ({}) {}", comm, TAIL)
    }

    #[test]
    fn test_parse_full_line() {
        let stat = parse_stat_line(&line("bash")).unwrap();
        assert_eq!(stat.pid, 1234);
        assert_eq!(stat.comm, "bash");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.ppid, 1);
        assert_eq!(stat.tpgid, -1);
        assert_eq!(stat.minflt, 100);
        assert_eq!(stat.majflt, 7);
        assert_eq!(stat.utime, 250);
        assert_eq!(stat.stime, 120);
        assert_eq!(stat.priority, 20);
        assert_eq!(stat.vsize, 12_345_678);
        assert_eq!(stat.rss, 300);
        assert_eq!(stat.rsslim, u64::MAX);
        assert_eq!(stat.exit_signal, 17);
        assert_eq!(stat.processor, 1);
    }

    #[test]
    fn test_command_with_nested_parens() {
        let stat = parse_stat_line(&line("my(app)")).unwrap();
        assert_eq!(stat.comm, "my(app)");
        assert_eq!(stat.state, 'S');
    }

    #[test]
    fn test_command_with_spaces_and_close_paren() {
        let stat = parse_stat_line(&line("a) b (c")).unwrap();
        assert_eq!(stat.comm, "a) b (c");
        assert_eq!(stat.ppid, 1);
    }

    #[test]
    fn test_trailing_newline_tolerated() {
        let stat = parse_stat_line(&format!("{}\n", line("init"))).unwrap();
        assert_eq!(stat.comm, "init");
        assert_eq!(stat.processor, 1);
    }

    #[test]
    fn test_exactly_39_fields_accepted() {
        let short_tail: Vec<&str> = TAIL.split_whitespace().take(STAT_FIELD_COUNT - 2).collect();
        let stat = parse_stat_line(&format!("5 (x) {}", short_tail.join(" "))).unwrap();
        assert_eq!(stat.pid, 5);
        assert_eq!(stat.processor, 1);
    }

    #[test]
    fn test_too_few_fields_is_malformed() {
        let short_tail: Vec<&str> = TAIL.split_whitespace().take(STAT_FIELD_COUNT - 3).collect();
        let err = parse_stat_line(&format!("5 (x) {}", short_tail.join(" "))).unwrap_err();
        match err {
            ProcError::MalformedRecord { reason, .. } => {
                assert!(reason.contains("found 38"), "reason: {reason}");
                assert!(reason.contains("processor"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_parens_is_malformed() {
        assert!(parse_stat_line("1234 bash S 1 2 3").is_err());
        assert!(parse_stat_line("1234 (bash S 1 2 3").is_err());
        assert!(parse_stat_line("").is_err());
    }

    #[test]
    fn test_non_numeric_field_is_malformed() {
        let bad = line("bash").replacen(" 250 ", " lots ", 1);
        let err = parse_stat_line(&bad).unwrap_err();
        assert!(err.to_string().contains("utime"));
    }

    #[test]
    fn test_negative_unsigned_field_is_malformed() {
        let bad = line("bash").replacen(" 12345678 ", " -5 ", 1);
        assert!(parse_stat_line(&bad).is_err());
    }

    #[test]
    fn test_multi_char_state_is_malformed() {
        let bad = format!("1 (x) SS{}", &TAIL[1..]);
        assert!(parse_stat_line(&bad).is_err());
    }

    #[test]
    fn test_long_command_is_bounded() {
        let long = "x".repeat(400);
        let stat = parse_stat_line(&line(&long)).unwrap();
        assert_eq!(stat.comm.len(), crate::process::table::MAX_COMMAND_LEN);
    }
}

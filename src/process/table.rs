//! Normalized process entries and the pid-keyed snapshot table.
//!
//! A table is filled in one pass, then `link_children` derives the
//! parent/child lists. Tree queries only make sense after linking.

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use serde::Serialize;

/// Longest command name kept, in bytes.
pub const MAX_COMMAND_LEN: usize = 255;

/// Copies at most `MAX_COMMAND_LEN` bytes, never splitting a character.
pub fn bounded_command(name: &str) -> String {
    if name.len() <= MAX_COMMAND_LEN {
        return name.to_string();
    }
    let mut end = MAX_COMMAND_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// One process, normalized to bytes and seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessInfo {
    pub id: u32,
    pub parent_id: u32,
    pub command: String,
    /// Virtual size in bytes.
    pub swap_size: u64,
    /// Resident size in bytes.
    pub working_set_size: u64,
    pub user_time: f64,
    pub kernel_time: f64,
    /// Minor plus major faults.
    pub page_fault_count: u64,
    pub is_owned_by_monitored_app: bool,
    pub is_low_priority: bool,
    pub children: Vec<u32>,
}

/// Resource totals over a set of processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResourceUsage {
    pub processes: usize,
    pub working_set_size: u64,
    pub swap_size: u64,
    pub user_time: f64,
    pub kernel_time: f64,
    pub page_fault_count: u64,
}

impl ResourceUsage {
    pub fn add(&mut self, p: &ProcessInfo) {
        self.processes += 1;
        self.working_set_size = self.working_set_size.saturating_add(p.working_set_size);
        self.swap_size = self.swap_size.saturating_add(p.swap_size);
        self.user_time += p.user_time;
        self.kernel_time += p.kernel_time;
        self.page_fault_count = self.page_fault_count.saturating_add(p.page_fault_count);
    }

    pub fn cpu_time(&self) -> f64 {
        self.user_time + self.kernel_time
    }
}

/// Snapshot of all processes, keyed by pid.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    entries: HashMap<u32, ProcessInfo>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the previous one for the same pid.
    pub fn insert(&mut self, info: ProcessInfo) -> Option<ProcessInfo> {
        self.entries.insert(info.id, info)
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessInfo> {
        self.entries.get(&pid)
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.entries.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessInfo> {
        self.entries.values()
    }

    /// Entries ordered by pid.
    pub fn sorted(&self) -> Vec<&ProcessInfo> {
        let mut out: Vec<&ProcessInfo> = self.entries.values().collect();
        out.sort_by_key(|p| p.id);
        out
    }

    /// Pids whose parent is not part of the snapshot, ascending.
    pub fn roots(&self) -> Vec<u32> {
        let mut roots: Vec<u32> = self
            .entries
            .values()
            .filter(|p| p.parent_id == p.id || !self.entries.contains_key(&p.parent_id))
            .map(|p| p.id)
            .collect();
        roots.sort_unstable();
        roots
    }

    /// All transitive children of `pid`, excluding `pid` itself.
    pub fn descendants(&self, pid: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut seen: HashSet<u32> = HashSet::new();
        seen.insert(pid);
        let mut stack: Vec<u32> = match self.entries.get(&pid) {
            Some(p) => p.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            if let Some(p) = self.entries.get(&next) {
                stack.extend(p.children.iter().rev().copied());
            }
        }
        out
    }

    /// Usage of `pid` plus all of its descendants.
    pub fn tree_usage(&self, pid: u32) -> ResourceUsage {
        let mut usage = ResourceUsage::default();
        let Some(root) = self.entries.get(&pid) else {
            return usage;
        };
        usage.add(root);
        for child in self.descendants(pid) {
            if let Some(p) = self.entries.get(&child) {
                usage.add(p);
            }
        }
        usage
    }

    /// Pids owned by the monitored application, or descended from one.
    fn owned_set(&self) -> HashSet<u32> {
        let mut owned = HashSet::new();
        for p in self.entries.values().filter(|p| p.is_owned_by_monitored_app) {
            if owned.insert(p.id) {
                owned.extend(self.descendants(p.id));
            }
        }
        owned
    }

    /// Usage of monitored-application processes and their descendants.
    pub fn owned_usage(&self) -> ResourceUsage {
        let owned = self.owned_set();
        let mut usage = ResourceUsage::default();
        for p in self.entries.values().filter(|p| owned.contains(&p.id)) {
            usage.add(p);
        }
        usage
    }

    /// Usage of everything not counted by `owned_usage`.
    pub fn foreign_usage(&self) -> ResourceUsage {
        let owned = self.owned_set();
        let mut usage = ResourceUsage::default();
        for p in self.entries.values().filter(|p| !owned.contains(&p.id)) {
            usage.add(p);
        }
        usage
    }
}

impl FromIterator<ProcessInfo> for ProcessTable {
    fn from_iter<I: IntoIterator<Item = ProcessInfo>>(iter: I) -> Self {
        let mut table = ProcessTable::new();
        for p in iter {
            table.insert(p);
        }
        table
    }
}

/// Rebuilds every entry's `children` from the parent ids in the table.
///
/// Must run after all entries are inserted: parents may be listed after
/// their children. Children end up in ascending pid order.
pub fn link_children(table: &mut ProcessTable) {
    let mut links: Vec<(u32, u32)> = table
        .entries
        .values()
        .filter(|p| p.parent_id != p.id && table.entries.contains_key(&p.parent_id))
        .map(|p| (p.parent_id, p.id))
        .collect();
    links.sort_unstable();

    for p in table.entries.values_mut() {
        p.children.clear();
    }
    for (parent, child) in links {
        if let Some(p) = table.entries.get_mut(&parent) {
            p.children.push(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(id: u32, parent_id: u32) -> ProcessInfo {
        ProcessInfo {
            id,
            parent_id,
            command: format!("p{id}"),
            working_set_size: 1024,
            swap_size: 2048,
            user_time: 1.0,
            kernel_time: 0.5,
            page_fault_count: 3,
            ..Default::default()
        }
    }

    fn linked(entries: Vec<ProcessInfo>) -> ProcessTable {
        let mut table: ProcessTable = entries.into_iter().collect();
        link_children(&mut table);
        table
    }

    #[test]
    fn test_bounded_command_respects_char_boundary() {
        let name = format!("{}é", "a".repeat(MAX_COMMAND_LEN - 1));
        let bounded = bounded_command(&name);
        assert_eq!(bounded.len(), MAX_COMMAND_LEN - 1);
        assert_eq!(bounded_command("short"), "short");
    }

    #[test]
    fn test_link_children_parent_listed_after_child() {
        let table = linked(vec![proc(42, 7), proc(43, 7), proc(7, 1)]);
        assert_eq!(table.get(7).unwrap().children, vec![42, 43]);
        assert!(table.get(42).unwrap().children.is_empty());
    }

    #[test]
    fn test_link_children_each_child_once() {
        let mut table = linked(vec![proc(1, 0), proc(2, 1), proc(3, 1), proc(4, 2)]);
        // Linking twice must not duplicate entries.
        link_children(&mut table);
        for p in table.iter() {
            if let Some(parent) = table.get(p.parent_id) {
                let n = parent.children.iter().filter(|&&c| c == p.id).count();
                assert_eq!(n, 1, "pid {} listed {} times", p.id, n);
            }
        }
    }

    #[test]
    fn test_missing_parent_makes_root() {
        let table = linked(vec![proc(10, 999), proc(11, 10), proc(1, 0)]);
        assert_eq!(table.roots(), vec![1, 10]);
        assert_eq!(table.get(10).unwrap().children, vec![11]);
    }

    #[test]
    fn test_self_parent_is_not_own_child() {
        let table = linked(vec![proc(0, 0), proc(1, 0)]);
        assert_eq!(table.get(0).unwrap().children, vec![1]);
        assert_eq!(table.roots(), vec![0]);
    }

    #[test]
    fn test_descendants_and_tree_usage() {
        let table = linked(vec![proc(1, 0), proc(2, 1), proc(3, 2), proc(4, 2), proc(5, 0)]);
        assert_eq!(table.descendants(1), vec![2, 3, 4]);
        assert!(table.descendants(5).is_empty());
        assert!(table.descendants(404).is_empty());

        let usage = table.tree_usage(2);
        assert_eq!(usage.processes, 3);
        assert_eq!(usage.working_set_size, 3 * 1024);
        assert_eq!(usage.page_fault_count, 9);
        assert!((usage.cpu_time() - 4.5).abs() < 1e-9);
        assert_eq!(table.tree_usage(404), ResourceUsage::default());
    }

    #[test]
    fn test_owned_and_foreign_usage_partition() {
        let mut client = proc(100, 1);
        client.is_owned_by_monitored_app = true;
        // Owned child of an owned parent must only be counted once.
        let mut helper = proc(102, 100);
        helper.is_owned_by_monitored_app = true;
        let table = linked(vec![proc(1, 0), client, proc(101, 100), helper, proc(200, 1)]);

        let owned = table.owned_usage();
        let foreign = table.foreign_usage();
        assert_eq!(owned.processes, 3);
        assert_eq!(foreign.processes, 2);
        assert_eq!(owned.processes + foreign.processes, table.len());
    }
}

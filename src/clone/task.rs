//! Clone task derivation.
//!
//! A [`CloneTask`] is built once per source at batch start. The local
//! directory name is the last path segment of the source with a trailing
//! `.git` removed.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Suffix stripped from the last path segment of a source location.
const VCS_SUFFIX: &str = ".git";

/// Name used when a source has no usable final segment.
const FALLBACK_NAME: &str = "repository";

/// One unit of work: clone `source` into `target_dir/local_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneTask {
    index: usize,
    source: String,
    local_name: String,
    target_dir: PathBuf,
}

impl CloneTask {
    /// Create a task, deriving the local name from the source.
    pub fn new(index: usize, source: impl Into<String>, target_dir: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let local_name = local_name_for(&source);
        Self {
            index,
            source,
            local_name,
            target_dir: target_dir.into(),
        }
    }

    fn renamed(&self, local_name: String) -> Self {
        Self {
            local_name,
            ..self.clone()
        }
    }

    /// Submission index, unique within a batch.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Directory the clone is written into.
    pub fn destination(&self) -> PathBuf {
        self.target_dir.join(&self.local_name)
    }
}

/// Derive the local directory name for a source location.
///
/// Handles URLs, filesystem paths and scp-style `git@host:owner/name.git`.
pub fn local_name_for(source: &str) -> String {
    let trimmed = source.trim().trim_end_matches(['/', '\\']);
    let segment = trimmed.rsplit(['/', '\\', ':']).next().unwrap_or(trimmed);
    let name = segment.strip_suffix(VCS_SUFFIX).unwrap_or(segment);

    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// What to do when two sources derive the same local name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Rename later duplicates to `name-2`, `name-3`, ...
    #[default]
    Suffix,
    /// Record a failure for every duplicate after the first, without cloning it
    Fail,
}

/// A task after collision handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedTask {
    /// Ready to be dispatched to a worker
    Ready(CloneTask),
    /// Never dispatched; carries the reason
    Rejected(CloneTask, String),
}

impl PlannedTask {
    pub fn task(&self) -> &CloneTask {
        match self {
            PlannedTask::Ready(task) | PlannedTask::Rejected(task, _) => task,
        }
    }
}

/// Build one planned task per source, in submission order.
pub fn plan_tasks(sources: &[String], target_dir: &Path, policy: CollisionPolicy) -> Vec<PlannedTask> {
    let mut used: HashSet<String> = HashSet::new();
    let mut claimed_by: HashMap<String, String> = HashMap::new();
    let mut planned = Vec::with_capacity(sources.len());

    for (index, source) in sources.iter().enumerate() {
        let task = CloneTask::new(index, source.clone(), target_dir);

        if used.insert(task.local_name().to_string()) {
            claimed_by.insert(task.local_name().to_string(), source.clone());
            planned.push(PlannedTask::Ready(task));
            continue;
        }

        match policy {
            CollisionPolicy::Suffix => {
                let base = task.local_name().to_string();
                let mut n = 2;
                let mut candidate = format!("{}-{}", base, n);
                while used.contains(&candidate) {
                    n += 1;
                    candidate = format!("{}-{}", base, n);
                }
                log::warn!("{} collides on '{}', cloning into '{}'", source, base, candidate);
                used.insert(candidate.clone());
                planned.push(PlannedTask::Ready(task.renamed(candidate)));
            }
            CollisionPolicy::Fail => {
                let owner = claimed_by.get(task.local_name()).cloned().unwrap_or_default();
                let reason = format!(
                    "destination '{}' is already claimed by {}",
                    task.local_name(),
                    owner
                );
                planned.push(PlannedTask::Rejected(task, reason));
            }
        }
    }

    planned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_local_name_strips_git_suffix() {
        assert_eq!(local_name_for("https://github.com/alice/tool.git"), "tool");
    }

    #[test]
    fn test_local_name_without_suffix() {
        assert_eq!(local_name_for("https://github.com/alice/tool"), "tool");
    }

    #[test]
    fn test_local_name_trailing_slash() {
        assert_eq!(local_name_for("https://github.com/alice/tool.git/"), "tool");
    }

    #[test]
    fn test_local_name_only_strips_trailing_suffix() {
        assert_eq!(local_name_for("https://host/a/my.github.io.git"), "my.github.io");
        assert_eq!(local_name_for("https://host/a/.gitignore-templates"), ".gitignore-templates");
    }

    #[test]
    fn test_local_name_scp_style() {
        assert_eq!(local_name_for("git@github.com:alice/tool.git"), "tool");
        assert_eq!(local_name_for("git@host:tool.git"), "tool");
    }

    #[test]
    fn test_local_name_local_path() {
        assert_eq!(local_name_for("/srv/git/project.git"), "project");
    }

    #[test]
    fn test_local_name_fallback() {
        assert_eq!(local_name_for(""), "repository");
        assert_eq!(local_name_for(".git"), "repository");
    }

    #[test]
    fn test_destination() {
        let task = CloneTask::new(0, "https://host/a.git", "./out");
        assert_eq!(task.destination(), PathBuf::from("./out/a"));
        assert_eq!(task.index(), 0);
        assert_eq!(task.source(), "https://host/a.git");
    }

    #[test]
    fn test_plan_without_collisions() {
        let planned = plan_tasks(
            &sources(&["https://host/a.git", "https://host/b.git"]),
            Path::new("out"),
            CollisionPolicy::Suffix,
        );
        assert_eq!(planned.len(), 2);
        assert!(planned.iter().all(|p| matches!(p, PlannedTask::Ready(_))));
        assert_eq!(planned[0].task().local_name(), "a");
        assert_eq!(planned[1].task().local_name(), "b");
    }

    #[test]
    fn test_plan_suffixes_collisions() {
        let planned = plan_tasks(
            &sources(&["https://x/a.git", "https://y/a.git", "https://z/a"]),
            Path::new("out"),
            CollisionPolicy::Suffix,
        );
        let names: Vec<&str> = planned.iter().map(|p| p.task().local_name()).collect();
        assert_eq!(names, vec!["a", "a-2", "a-3"]);
    }

    #[test]
    fn test_plan_suffix_skips_taken_names() {
        let planned = plan_tasks(
            &sources(&["https://x/a-2.git", "https://x/a.git", "https://y/a.git"]),
            Path::new("out"),
            CollisionPolicy::Suffix,
        );
        let names: Vec<&str> = planned.iter().map(|p| p.task().local_name()).collect();
        assert_eq!(names, vec!["a-2", "a", "a-3"]);
    }

    #[test]
    fn test_plan_fail_policy_rejects_duplicates() {
        let planned = plan_tasks(
            &sources(&["https://x/a.git", "https://y/a.git"]),
            Path::new("out"),
            CollisionPolicy::Fail,
        );
        assert!(matches!(planned[0], PlannedTask::Ready(_)));
        match &planned[1] {
            PlannedTask::Rejected(task, reason) => {
                assert_eq!(task.index(), 1);
                assert!(reason.contains("https://x/a.git"));
            }
            other => panic!("Expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_collision_policy_deserialize() {
        let policy: CollisionPolicy = serde_yaml::from_str("fail").unwrap();
        assert_eq!(policy, CollisionPolicy::Fail);
        assert_eq!(CollisionPolicy::default(), CollisionPolicy::Suffix);
    }
}

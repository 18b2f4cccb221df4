use crate::common::command::{
    git_commit_with_timestamp, git_rev_parse, git_tag_with_timestamp, run_git_command,
    run_git_command_at, run_git_sort_command,
};
use crate::common::file::{FileSpec, patch_content, series_content, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A kernel-like upstream repository next to a kernel-source checkout
///
/// ```text
/// base ── net_a ── net_b ────────── merge ── after_rc ── head
///   \               (v4.9)          /  (v4.10-rc1)
///    └──────── late_fix ───────────┘
/// ```
///
/// `late_fix` is authored before `net_a` but only reaches master through the
/// merge, so it belongs to v4.10-rc1 while sorting ahead of v4.9 commits by date.
pub struct Upstream {
    pub dir: TempDir,
    commits: HashMap<&'static str, String>,
}

impl Upstream {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn linux_dir(&self) -> PathBuf {
        self.root().join("linux")
    }

    pub fn git_dir(&self) -> PathBuf {
        self.linux_dir().join(".git")
    }

    /// git-sort run from the fixture root against the upstream repository
    pub fn git_sort(&self, args: &[&str]) -> Command {
        let mut cmd = run_git_sort_command(self.root(), &[]);
        cmd.arg("--git-dir").arg(self.git_dir());
        cmd.args(args);
        cmd
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root().join("kernel-source")
    }

    pub fn series_path(&self) -> PathBuf {
        self.source_dir().join("series.conf")
    }

    pub fn commit(&self, name: &str) -> &str {
        self.commits
            .get(name)
            .unwrap_or_else(|| panic!("no upstream commit named {name}"))
    }

    pub fn patch_name(name: &str) -> String {
        format!("patches.suse/{name}.patch")
    }

    pub fn patch_path(&self, name: &str) -> PathBuf {
        self.source_dir().join(Self::patch_name(name))
    }

    /// Write a backport of upstream commit `name` claiming release `mainline`
    pub fn write_patch(&self, name: &str, mainline: &str) {
        write_file(FileSpec::new(
            self.patch_path(name),
            patch_content(self.commit(name), mainline),
        ));
    }

    /// Write series.conf with a sorted section listing backports of `names`
    pub fn write_series(&self, names: &[&str]) {
        let entries = names
            .iter()
            .map(|name| Self::patch_name(name))
            .collect::<Vec<_>>();
        let entries = entries.iter().map(String::as_str).collect::<Vec<_>>();

        write_file(FileSpec::new(self.series_path(), series_content(&entries)));
    }
}

#[fixture]
pub fn upstream() -> Upstream {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let linux = dir.path().join("linux");
    std::fs::create_dir_all(&linux).expect("Failed to create upstream directory");
    let git = linux.as_path();

    run_git_command(git, &["init", "-q"]).assert().success();
    run_git_command(git, &["symbolic-ref", "HEAD", "refs/heads/master"])
        .assert()
        .success();

    git_commit_with_timestamp(git, "base", "2017-01-01 10:00:00 +0000")
        .assert()
        .success();
    git_commit_with_timestamp(git, "net_a", "2017-01-03 10:00:00 +0000")
        .assert()
        .success();
    git_commit_with_timestamp(git, "net_b", "2017-01-04 10:00:00 +0000")
        .assert()
        .success();
    git_tag_with_timestamp(git, "v4.9", "2017-01-05 10:00:00 +0000")
        .assert()
        .success();

    run_git_command(git, &["checkout", "-q", "-b", "fixes", "HEAD~2"])
        .assert()
        .success();
    git_commit_with_timestamp(git, "late_fix", "2017-01-02 10:00:00 +0000")
        .assert()
        .success();
    run_git_command(git, &["checkout", "-q", "master"])
        .assert()
        .success();
    run_git_command_at(
        git,
        "2017-01-06 10:00:00 +0000",
        &["merge", "-q", "--no-ff", "-m", "merge", "fixes"],
    )
    .assert()
    .success();
    git_tag_with_timestamp(git, "v4.10-rc1", "2017-01-07 10:00:00 +0000")
        .assert()
        .success();

    git_commit_with_timestamp(git, "after_rc", "2017-01-08 10:00:00 +0000")
        .assert()
        .success();
    git_commit_with_timestamp(git, "head", "2017-01-09 10:00:00 +0000")
        .assert()
        .success();

    let commits = [
        ("base", "v4.9~2"),
        ("net_a", "v4.9~1"),
        ("net_b", "v4.9"),
        ("late_fix", "fixes"),
        ("merge", "v4.10-rc1"),
        ("after_rc", "master~1"),
        ("head", "master"),
    ]
    .into_iter()
    .map(|(name, revision)| (name, git_rev_parse(git, revision)))
    .collect();

    Upstream { dir, commits }
}

use assert_cmd::Command;
use std::path::Path;

const GIT_IDENTITY: [&str; 10] = [
    "-c",
    "user.name=A U Thor",
    "-c",
    "user.email=author@example.com",
    "-c",
    "commit.gpgsign=false",
    "-c",
    "tag.gpgsign=false",
    "-c",
    "init.defaultBranch=master",
];

/// Environment variables that would redirect either git or git-sort away from the fixture
const LEAKY_ENV: [&str; 7] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "LINUX_GIT",
    "GIT_SORT_UPSTREAM",
    "GIT_SORT_TAG_PATTERN",
    "GIT_SORT_CACHE",
];

pub fn run_git_sort_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("git-sort").expect("Failed to find git-sort binary");
    for var in LEAKY_ENV {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "warn");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn run_git_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    for var in LEAKY_ENV {
        cmd.env_remove(var);
    }
    cmd.env("GIT_CONFIG_NOSYSTEM", "1");
    cmd.env("HOME", dir);
    cmd.current_dir(dir);
    cmd.args(GIT_IDENTITY);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Run git with author and committer dates pinned to `date`
pub fn run_git_command_at(dir: &Path, date: &str, args: &[&str]) -> Command {
    let mut cmd = run_git_command(dir, args);
    cmd.env("GIT_AUTHOR_DATE", date);
    cmd.env("GIT_COMMITTER_DATE", date);
    cmd
}

pub fn git_commit_with_timestamp(dir: &Path, message: &str, date: &str) -> Command {
    run_git_command_at(dir, date, &["commit", "-q", "--allow-empty", "-m", message])
}

pub fn git_tag_with_timestamp(dir: &Path, tag: &str, date: &str) -> Command {
    run_git_command_at(dir, date, &["tag", "-a", tag, "-m", tag])
}

pub fn git_rev_parse(dir: &Path, revision: &str) -> String {
    let output = run_git_command(dir, &["rev-parse", &format!("{revision}^{{commit}}")])
        .output()
        .expect("Failed to run git rev-parse");
    assert!(output.status.success(), "git rev-parse {revision} failed");

    String::from_utf8(output.stdout)
        .expect("git rev-parse printed non-UTF-8")
        .trim()
        .to_string()
}

use crate::common::command::{git_commit_with_timestamp, git_rev_parse};
use crate::common::upstream::{Upstream, upstream};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn reuse_index_cache_between_runs(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    let cache = upstream.root().join("cache/git-sort.idx");
    let cache_arg = cache.to_str().unwrap();
    let head = upstream.commit("head").to_string();

    upstream
        .git_sort(&["--cache-file", cache_arg, "dump-heads"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("No usable cache\n"))
        .stdout(predicate::str::contains(format!(
            "Current heads (version 1):\n\tHEAD {head}\n"
        )))
        .stdout(predicate::str::ends_with("Will rebuild history\n"));
    assert!(!cache.exists());

    upstream
        .git_sort(&["--cache-file", cache_arg, "describe", upstream.commit("late_fix")])
        .assert()
        .success()
        .stdout("v4.10-rc1\n");
    assert!(cache.is_file());

    upstream
        .git_sort(&["--cache-file", cache_arg, "dump-heads"])
        .assert()
        .success()
        .stdout(format!(
            "Cached heads (version 1):\n\tHEAD {head}\n\
             Current heads (version 1):\n\tHEAD {head}\n\
             Will not rebuild history\n"
        ));

    upstream
        .git_sort(&["--cache-file", cache_arg, "rank", upstream.commit("late_fix")])
        .assert()
        .success()
        .stdout("3\n");

    let linux = upstream.linux_dir();
    git_commit_with_timestamp(&linux, "newer", "2017-01-10 10:00:00 +0000")
        .assert()
        .success();
    let newer = git_rev_parse(&linux, "master");

    upstream
        .git_sort(&["--cache-file", cache_arg, "dump-heads"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("\tHEAD {newer}\n")))
        .stdout(predicate::str::ends_with("Will rebuild history\n"));

    upstream
        .git_sort(&["--cache-file", cache_arg, "rank", &newer])
        .assert()
        .success()
        .stdout("7\n");

    Ok(())
}

#[rstest]
fn dump_heads_without_cache(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    upstream
        .git_sort(&["dump-heads"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("No cache configured\n"))
        .stdout(predicate::str::ends_with("Will rebuild history\n"));

    Ok(())
}

use crate::common::command::run_git_sort_command;
use crate::common::upstream::{Upstream, upstream};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn locate_upstream_through_linux_git(
    upstream: Upstream,
) -> Result<(), Box<dyn std::error::Error>> {
    run_git_sort_command(upstream.root(), &["describe", upstream.commit("net_a")])
        .env("LINUX_GIT", upstream.linux_dir())
        .assert()
        .success()
        .stdout("v4.9\n");

    Ok(())
}

#[rstest]
fn discover_upstream_from_a_subdirectory(
    upstream: Upstream,
) -> Result<(), Box<dyn std::error::Error>> {
    let nested = upstream.linux_dir().join("net").join("core");
    std::fs::create_dir_all(&nested)?;

    run_git_sort_command(&nested, &["describe", "HEAD"])
        .assert()
        .success()
        .stdout("v4.10 or v4.10-rc2 (next release)\n");

    Ok(())
}

#[rstest]
fn outside_any_repository_fails(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    run_git_sort_command(upstream.root(), &["rank", "HEAD"])
        .env("LINUX_GIT", upstream.root().join("missing"))
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: "));

    Ok(())
}

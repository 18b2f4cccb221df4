use crate::common::upstream::{Upstream, upstream};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
#[case("base", "v4.9")]
#[case("net_b", "v4.9")]
#[case("late_fix", "v4.10-rc1")]
#[case("merge", "v4.10-rc1")]
#[case("head", "v4.10 or v4.10-rc2 (next release)")]
fn describe_commit(
    upstream: Upstream,
    #[case] commit: &str,
    #[case] expected: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    upstream
        .git_sort(&["describe", upstream.commit(commit)])
        .assert()
        .success()
        .stdout(format!("{expected}\n"));

    Ok(())
}

#[rstest]
fn rank_follows_release_lines(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    let expected = ["base", "net_a", "net_b", "late_fix", "merge", "after_rc", "head"];

    for (rank, commit) in expected.iter().enumerate() {
        upstream
            .git_sort(&["rank", upstream.commit(commit)])
            .assert()
            .success()
            .stdout(format!("{rank}\n"));
    }

    Ok(())
}

#[rstest]
fn revisions_resolve_through_refs(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    upstream
        .git_sort(&["describe", "v4.10-rc1^"])
        .assert()
        .success()
        .stdout("v4.9\n");

    upstream
        .git_sort(&["rank", "fixes"])
        .assert()
        .success()
        .stdout("3\n");

    upstream
        .git_sort(&["rank", &upstream.commit("net_a")[..10]])
        .assert()
        .success()
        .stdout("1\n");

    Ok(())
}

#[rstest]
fn unknown_revision_fails(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    upstream
        .git_sort(&["describe", "no-such-branch"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown revision"));

    Ok(())
}

#[rstest]
fn commits_outside_the_upstream_are_not_ranked(
    upstream: Upstream,
) -> Result<(), Box<dyn std::error::Error>> {
    upstream
        .git_sort(&["--upstream", "v4.9", "rank", upstream.commit("late_fix")])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found in the upstream history"));

    Ok(())
}

#[rstest]
fn tag_pattern_selects_releases(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    upstream
        .git_sort(&["--tag-pattern", r"^v\d+\.\d+$", "describe", upstream.commit("late_fix")])
        .assert()
        .success()
        .stdout("v4.10-rc1\n");

    upstream
        .git_sort(&["--tag-pattern", "v(", "describe", "HEAD"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid tag pattern"));

    Ok(())
}

use crate::common::upstream::{Upstream, upstream};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn sort_lines_by_leading_commit(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    let input = format!(
        "{} head\n{} late fix\n{} base\n{} late fix again\n",
        upstream.commit("head"),
        upstream.commit("late_fix"),
        upstream.commit("base"),
        upstream.commit("late_fix"),
    );
    let expected = format!(
        "{} base\n{} late fix\n{} late fix again\n{} head\n",
        upstream.commit("base"),
        upstream.commit("late_fix"),
        upstream.commit("late_fix"),
        upstream.commit("head"),
    );

    upstream
        .git_sort(&["sort"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(expected);

    Ok(())
}

#[rstest]
fn unresolvable_line_is_reported_with_its_number(
    upstream: Upstream,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = format!("{} base\nnot-a-commit here\n", upstream.commit("base"));

    upstream
        .git_sort(&["sort"])
        .write_stdin(input)
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("line 2"));

    Ok(())
}

#[rstest]
fn lines_outside_the_upstream_follow_an_error(
    upstream: Upstream,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = format!(
        "{} late fix\n{} base\n",
        upstream.commit("late_fix"),
        upstream.commit("base"),
    );

    upstream
        .git_sort(&["--upstream", "v4.9", "sort"])
        .write_stdin(input)
        .assert()
        .code(1)
        .stdout(format!("{} base\n", upstream.commit("base")))
        .stderr(predicate::str::contains("not found in the indexed heads"))
        .stderr(predicate::str::contains("late fix"));

    Ok(())
}

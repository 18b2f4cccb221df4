use crate::common::file::read_file;
use crate::common::upstream::{Upstream, upstream};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn check_reports_outdated_mainline_tags(
    upstream: Upstream,
) -> Result<(), Box<dyn std::error::Error>> {
    upstream.write_patch("base", "v4.9");
    upstream.write_patch("late_fix", "v4.9");
    upstream.write_series(&["base", "late_fix"]);

    let patch = upstream.patch_path("late_fix");
    let before = read_file(&patch);

    upstream
        .git_sort(&["series", "--check", upstream.series_path().to_str().unwrap()])
        .assert()
        .code(2)
        .stdout(predicate::eq("Patch-mainline tags are outdated.\n"));

    assert_eq!(read_file(&patch), before);

    Ok(())
}

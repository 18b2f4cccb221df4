use crate::common::file::{FileSpec, write_file};
use crate::common::upstream::{Upstream, upstream};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn check_without_sorted_section_succeeds(
    upstream: Upstream,
) -> Result<(), Box<dyn std::error::Error>> {
    let series = upstream.series_path();
    write_file(FileSpec::new(
        series.clone(),
        "\tpatches.suse/b.patch\n\tpatches.suse/a.patch\n".to_string(),
    ));

    upstream
        .git_sort(&["series", "--check", series.to_str().unwrap()])
        .assert()
        .success();

    upstream
        .git_sort(&["series", series.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Sorted subseries not found"));

    Ok(())
}

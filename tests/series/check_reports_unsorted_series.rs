use crate::common::file::read_file;
use crate::common::upstream::{Upstream, upstream};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn check_reports_unsorted_series(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    upstream.write_patch("net_a", "v4.9");
    upstream.write_patch("base", "v4.9");
    upstream.write_series(&["net_a", "base"]);

    let series = upstream.series_path();
    let before = read_file(&series);

    upstream
        .git_sort(&["series", "-c", series.to_str().unwrap()])
        .assert()
        .code(2)
        .stdout(predicate::eq("Input is not sorted.\n"));

    assert_eq!(read_file(&series), before);

    Ok(())
}

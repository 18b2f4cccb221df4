use crate::common::file::{read_file, series_content};
use crate::common::upstream::{Upstream, upstream};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn sort_unsorted_series(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    upstream.write_patch("base", "v4.9");
    upstream.write_patch("net_b", "v4.9");
    upstream.write_patch("late_fix", "v4.10-rc1");
    upstream.write_series(&["net_b", "late_fix", "base"]);

    let series = upstream.series_path();
    upstream
        .git_sort(&["series", series.to_str().unwrap()])
        .assert()
        .success()
        .stdout("");

    assert_eq!(
        read_file(&series),
        series_content(&[
            "patches.suse/base.patch",
            "patches.suse/net_b.patch",
            "patches.suse/late_fix.patch",
        ])
    );

    // A second run has nothing left to do
    upstream
        .git_sort(&["series", "--check", series.to_str().unwrap()])
        .assert()
        .success()
        .stdout("");

    Ok(())
}

use crate::common::file::read_file;
use crate::common::upstream::{Upstream, upstream};
use rstest::rstest;

#[rstest]
fn empty_sorted_section_is_left_alone(
    upstream: Upstream,
) -> Result<(), Box<dyn std::error::Error>> {
    upstream.write_series(&[]);

    let series = upstream.series_path();
    let before = read_file(&series);

    upstream
        .git_sort(&["series", "--check", series.to_str().unwrap()])
        .assert()
        .success();
    upstream
        .git_sort(&["series", series.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(read_file(&series), before);

    Ok(())
}

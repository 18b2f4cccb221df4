use crate::common::file::read_file;
use crate::common::upstream::{Upstream, upstream};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn refresh_outdated_mainline_tags(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    upstream.write_patch("base", "v4.9");
    upstream.write_patch("late_fix", "v4.9");
    upstream.write_patch("head", "Queued in subsystem maintainer repository");
    upstream.write_series(&["base", "late_fix", "head"]);

    let series = upstream.series_path();
    let series_before = read_file(&series);
    let base_before = read_file(&upstream.patch_path("base"));
    let late_fix_before = read_file(&upstream.patch_path("late_fix"));

    upstream
        .git_sort(&["series", series.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(read_file(&series), series_before);
    assert_eq!(read_file(&upstream.patch_path("base")), base_before);
    assert_eq!(
        read_file(&upstream.patch_path("late_fix")),
        late_fix_before.replace("Patch-mainline: v4.9\n", "Patch-mainline: v4.10-rc1\n")
    );
    assert!(
        read_file(&upstream.patch_path("head"))
            .contains("Patch-mainline: v4.10 or v4.10-rc2 (next release)\n")
    );

    Ok(())
}

use crate::common::file::{FileSpec, patch_content, read_file, write_file};
use crate::common::upstream::{Upstream, upstream};
use predicates::prelude::*;
use rstest::rstest;

fn write_untagged_patch(upstream: &Upstream, name: &str) {
    let content = patch_content(upstream.commit(name), "")
        .lines()
        .filter(|line| !line.starts_with("Patch-mainline:"))
        .map(|line| format!("{line}\n"))
        .collect::<String>();

    write_file(FileSpec::new(upstream.patch_path(name), content));
}

#[rstest]
#[case(&["series"])]
#[case(&["series", "--check"])]
fn missing_mainline_tag_aborts_without_writing(
    upstream: Upstream,
    #[case] args: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    upstream.write_patch("net_b", "v4.9");
    write_untagged_patch(&upstream, "base");
    upstream.write_series(&["net_b", "base"]);

    let series = upstream.series_path();
    let series_before = read_file(&series);
    let base_before = read_file(&upstream.patch_path("base"));

    let mut args = args.to_vec();
    args.push(series.to_str().unwrap());
    upstream
        .git_sort(&args)
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains(
            "Patch \"patches.suse/base.patch\" (series line 8): no Patch-mainline tag",
        ));

    assert_eq!(read_file(&series), series_before);
    assert_eq!(read_file(&upstream.patch_path("base")), base_before);

    Ok(())
}

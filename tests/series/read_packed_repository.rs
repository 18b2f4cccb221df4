use crate::common::command::run_git_command;
use crate::common::file::read_file;
use crate::common::upstream::{Upstream, upstream};
use predicates::prelude::*;
use rstest::rstest;

/// After `git gc` every object lives in a pack and every ref in packed-refs
#[rstest]
fn read_packed_repository(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    run_git_command(&upstream.linux_dir(), &["gc", "-q", "--aggressive"])
        .assert()
        .success();
    assert!(upstream.git_dir().join("packed-refs").is_file());

    upstream
        .git_sort(&["describe", upstream.commit("late_fix")])
        .assert()
        .success()
        .stdout("v4.10-rc1\n");

    upstream.write_patch("net_b", "v4.9");
    upstream.write_patch("net_a", "v4.9");
    upstream.write_series(&["net_b", "net_a"]);

    let series = upstream.series_path();
    upstream
        .git_sort(&["series", series.to_str().unwrap()])
        .assert()
        .success();

    assert!(
        read_file(&series)
            .contains("\tpatches.suse/net_a.patch\n\tpatches.suse/net_b.patch\n")
    );

    upstream
        .git_sort(&["rank", "v4.9"])
        .assert()
        .success()
        .stdout(predicate::eq("2\n"));

    Ok(())
}

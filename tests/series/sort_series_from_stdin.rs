use crate::common::upstream::{Upstream, upstream};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn sort_series_from_stdin(upstream: Upstream) -> Result<(), Box<dyn std::error::Error>> {
    upstream.write_patch("head", "v4.10 or v4.10-rc2 (next release)");
    upstream.write_patch("late_fix", "v4.10-rc1");
    upstream.write_patch("net_a", "v4.9");

    let source_dir = upstream.source_dir();
    upstream
        .git_sort(&["series", "--prefix", source_dir.to_str().unwrap()])
        .write_stdin(
            "\tpatches.suse/head.patch\n\
             patches.suse/late_fix.patch\n\
             \tpatches.suse/net_a.patch\n",
        )
        .assert()
        .success()
        .stdout(predicate::eq(
            "\tpatches.suse/net_a.patch\n\
             \tpatches.suse/late_fix.patch\n\
             \tpatches.suse/head.patch\n",
        ));

    Ok(())
}

#[rstest]
fn check_from_stdin_reports_through_exit_status(
    upstream: Upstream,
) -> Result<(), Box<dyn std::error::Error>> {
    upstream.write_patch("base", "v4.9");
    upstream.write_patch("net_a", "v4.9");

    let source_dir = upstream.source_dir();
    upstream
        .git_sort(&["series", "-c", "-p", source_dir.to_str().unwrap()])
        .write_stdin("\tpatches.suse/base.patch\n\tpatches.suse/net_a.patch\n")
        .assert()
        .success()
        .stdout("");

    upstream
        .git_sort(&["series", "-c", "-p", source_dir.to_str().unwrap()])
        .write_stdin("\tpatches.suse/net_a.patch\n\tpatches.suse/base.patch\n")
        .assert()
        .code(2)
        .stdout("Input is not sorted.\n");

    Ok(())
}

mod check_reports_outdated_mainline_tags;
mod check_reports_unsorted_series;
mod check_without_sorted_section_succeeds;
mod describe_and_rank_commits;
mod empty_sorted_section_is_left_alone;
mod locate_upstream_through_linux_git;
mod missing_mainline_tag_aborts_without_writing;
mod read_packed_repository;
mod refresh_outdated_mainline_tags;
mod reuse_index_cache_between_runs;
mod sort_lines_by_leading_commit;
mod sort_series_from_stdin;
mod sort_unsorted_series;

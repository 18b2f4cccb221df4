//! Hand-built histories shared by the ordering and series tests

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::ordering::graph::InMemoryGraph;
use chrono::{DateTime, FixedOffset, TimeZone};

/// Deterministic object id spelling out `id` in hex, padded with zeros
pub fn create_oid(id: &str) -> ObjectId {
    let mut hex_string = id
        .as_bytes()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<String>();

    while hex_string.len() < 40 {
        hex_string.push('0');
    }
    hex_string.truncate(40);

    ObjectId::try_parse(hex_string).expect("Invalid test ObjectId")
}

pub fn at(secs: i64) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .expect("valid offset")
        .timestamp_opt(secs, 0)
        .single()
        .expect("valid timestamp")
}

/// Two releases and some development past the last one
///
/// ```text
///   base(100) - net_a(300) - net_b(400) [v4.9 @500] ----- merge(600) [v4.10-rc1 @700]
///        \                                               /      \
///         late_fix(200) --------------------------------+        after_rc(750) - head(800)
/// ```
///
/// `master` points at `head`.
pub fn kernel_history() -> InMemoryGraph {
    let mut graph = InMemoryGraph::new();

    graph
        .add_commit(create_oid("base"), vec![], at(100))
        .add_commit(create_oid("net_a"), vec![create_oid("base")], at(300))
        .add_commit(create_oid("net_b"), vec![create_oid("net_a")], at(400))
        .add_commit(create_oid("late_fix"), vec![create_oid("base")], at(200))
        .add_commit(
            create_oid("merge"),
            vec![create_oid("net_b"), create_oid("late_fix")],
            at(600),
        )
        .add_commit(create_oid("after_rc"), vec![create_oid("merge")], at(750))
        .add_commit(create_oid("head"), vec![create_oid("after_rc")], at(800))
        .add_tag("v4.9", create_oid("net_b"), at(500))
        .add_tag("v4.10-rc1", create_oid("merge"), at(700))
        .add_ref("master", create_oid("head"));

    graph
}

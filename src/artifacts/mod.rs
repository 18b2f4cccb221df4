//! Data structures and algorithms
//!
//! - `objects`: git object types (commit, tag)
//! - `ordering`: the commit order index over upstream history
//! - `revision`: revision expressions naming upstream commits
//! - `series`: series documents, patch headers and the series sorter

pub mod objects;
pub mod ordering;
pub mod revision;
pub mod series;

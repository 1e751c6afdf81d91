//! Prefix/delimiter listing, filters, sort, and pagination (spec §4.4, C6).
//!
//! This crate is storage-agnostic: it operates on an already-gathered
//! `Vec<Metadata>` of candidates. Candidate *selection* (step 1 of the
//! pipeline) depends on how a backend indexes its keys, so it lives with
//! each backend; [`select_candidates`] is the reference implementation used
//! by backends that just hold everything in an ordered map (`vfs-indexed`'s
//! `MemoryStore`) and as the semantics SQL/KV push-down must match.

mod matcher;

pub use matcher::content_type_matches;

use serde::{Deserialize, Serialize};
use vfs_types::{FileType, Metadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    Key,
    Size,
    ModifyTime,
    CreateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A backend-agnostic metadata query (spec §4.4).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataQuery {
    pub prefix: String,
    /// `""` for a recursive match, `"/"` for direct-children-only.
    pub delimiter: String,
    pub content_type: Option<String>,
    pub file_type: Option<FileType>,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    pub attribute_match: std::collections::BTreeMap<String, String>,
    pub limit: Option<usize>,
    pub offset: usize,
    pub sort_by: Option<SortBy>,
    pub sort_order: SortOrder,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Asc
    }
}

/// The result of running a [`MetadataQuery`] (spec §4.4 step 4).
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub candidates: Vec<Metadata>,
    pub total_count: usize,
    pub paginating: bool,
}

/// Reference candidate-selection step (spec §4.4 step 1) over a full,
/// unordered set of entries. Ordered backends (a B-tree path index) can do
/// this with a contiguous range scan instead; this function exists so every
/// backend's push-down can be tested against the same semantics.
pub fn select_candidates<'a>(
    all: impl Iterator<Item = &'a Metadata>,
    query: &MetadataQuery,
) -> Vec<&'a Metadata> {
    if query.delimiter == "/" {
        all.filter(|m| direct_child(&query.prefix, &m.key)).collect()
    } else {
        // Recursive match: every key starting with the raw prefix string.
        all.filter(|m| m.key.starts_with(&query.prefix)).collect()
    }
}

fn direct_child(prefix: &str, key: &str) -> bool {
    match vfs_path::first_segment_below(prefix, key) {
        Some(seg) => {
            let full_child = vfs_path::join(prefix, seg);
            full_child == key
        }
        None => false,
    }
}

/// Apply filters, sort, and pagination to a gathered candidate set (spec
/// §4.4 steps 2-4). `candidates` need not be pre-sorted.
pub fn filter_sort_paginate(mut candidates: Vec<Metadata>, query: &MetadataQuery) -> QueryResult {
    candidates.retain(|m| passes_filters(m, query));

    // Ties are always broken by original insertion order (spec §4.4 step 3),
    // regardless of sort direction, so the comparator itself is flipped for
    // Desc rather than sorting ascending and reversing the whole vector
    // afterward — reversing would also flip the relative order of equal keys.
    let desc = query.sort_order == SortOrder::Desc;
    match query.sort_by {
        Some(SortBy::Key) => candidates.sort_by(|a, b| if desc { b.key.cmp(&a.key) } else { a.key.cmp(&b.key) }),
        Some(SortBy::Size) => candidates.sort_by(|a, b| if desc { b.size.cmp(&a.size) } else { a.size.cmp(&b.size) }),
        Some(SortBy::ModifyTime) => {
            candidates.sort_by(|a, b| if desc { b.modify_time.cmp(&a.modify_time) } else { a.modify_time.cmp(&b.modify_time) })
        }
        Some(SortBy::CreateTime) => {
            candidates.sort_by(|a, b| if desc { b.create_time.cmp(&a.create_time) } else { a.create_time.cmp(&b.create_time) })
        }
        None => {}
    }

    let total_count = candidates.len();
    let page: Vec<Metadata> = candidates
        .into_iter()
        .skip(query.offset)
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();
    let paginating = query.offset + page.len() < total_count;

    QueryResult {
        candidates: page,
        total_count,
        paginating,
    }
}

fn passes_filters(m: &Metadata, query: &MetadataQuery) -> bool {
    if let Some(ct) = &query.content_type {
        let actual = m.content_type.as_deref().unwrap_or("");
        if !content_type_matches(ct, actual) {
            return false;
        }
    }
    if let Some(ft) = query.file_type {
        if m.mode.file_type() != ft {
            return false;
        }
    }
    if let Some(min) = query.min_size {
        if m.size < min {
            return false;
        }
    }
    if let Some(max) = query.max_size {
        if m.size > max {
            return false;
        }
    }
    for (k, v) in &query.attribute_match {
        if m.attributes.get(k) != Some(v) {
            return false;
        }
    }
    true
}

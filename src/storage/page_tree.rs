//! Page tree traversal.
//!
//! Computes the set of page ids below one or more root pages. Only visible,
//! non-deleted pages are returned and traversal never descends through a
//! hidden or deleted page.

use std::collections::{HashSet, VecDeque};

use log::{debug, warn};
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;

/// Root page ids of every registered site.
pub async fn all_root_page_ids(pool: &SqlitePool) -> Result<Vec<i64>, DatabaseError> {
    let roots = sqlx::query_scalar::<_, i64>(
        "SELECT DISTINCT root_page_id FROM sites WHERE root_page_id > 0 ORDER BY root_page_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(roots)
}

/// Direct, visible children of `page_id` in tree order.
pub async fn child_pages(pool: &SqlitePool, page_id: i64) -> Result<Vec<i64>, DatabaseError> {
    let children = sqlx::query_scalar::<_, i64>(
        "SELECT uid FROM pages WHERE pid = ? AND deleted = 0 AND hidden = 0 ORDER BY sorting, uid",
    )
    .bind(page_id)
    .fetch_all(pool)
    .await?;
    Ok(children)
}

/// Collects the page ids below `root`, at most `depth` levels deep.
///
/// `begin` is the level at which collecting starts: 0 collects the direct
/// children and everything below, 1 skips the direct children, and so on.
/// The root itself is never part of the result. A root id <= 0 or a depth
/// of 0 yields an empty list.
///
/// A page reached twice (a cycle in a malformed tree) is not expanded again;
/// the traversal is truncated at that point.
pub async fn page_tree_ids(
    pool: &SqlitePool,
    root: i64,
    depth: u32,
    begin: u32,
) -> Result<Vec<i64>, DatabaseError> {
    if root <= 0 || depth == 0 {
        return Ok(Vec::new());
    }

    let mut page_ids = Vec::new();
    let mut visited = HashSet::from([root]);
    // (page, remaining depth, levels to skip before collecting)
    let mut queue = VecDeque::from([(root, depth, begin)]);

    while let Some((page_id, remaining, skip)) = queue.pop_front() {
        for child in child_pages(pool, page_id).await? {
            if !visited.insert(child) {
                warn!(
                    "Page {} reached twice below root {}, not descending again",
                    child, root
                );
                continue;
            }
            if skip == 0 {
                page_ids.push(child);
            }
            if remaining > 1 {
                queue.push_back((child, remaining - 1, skip.saturating_sub(1)));
            }
        }
    }

    Ok(page_ids)
}

/// Unions the page trees below every root, without duplicates.
pub async fn resolve(
    pool: &SqlitePool,
    roots: &[i64],
    max_depth: u32,
) -> Result<Vec<i64>, DatabaseError> {
    let mut seen = HashSet::new();
    let mut page_ids = Vec::new();
    for &root in roots {
        for page_id in page_tree_ids(pool, root, max_depth, 0).await? {
            if seen.insert(page_id) {
                page_ids.push(page_id);
            }
        }
    }
    Ok(page_ids)
}

/// Pages where references count for referenced-only mode.
///
/// `reference_root == 0` means every site root.
pub async fn allowed_page_ids(
    pool: &SqlitePool,
    reference_root: i64,
    max_depth: u32,
) -> Result<Vec<i64>, DatabaseError> {
    let roots = if reference_root == 0 {
        all_root_page_ids(pool).await?
    } else {
        vec![reference_root]
    };
    let page_ids = resolve(pool, &roots, max_depth).await?;
    debug!(
        "Resolved {} allowed page(s) below root(s) {:?}",
        page_ids.len(),
        roots
    );
    Ok(page_ids)
}

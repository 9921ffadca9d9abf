// storage/mod.rs
// File registry access: pool, migrations, selection and reference filtering

pub mod files;
pub mod migrations;
pub mod models;
pub mod page_tree;
pub mod pool;
pub mod references;
pub mod selection;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use files::{
    count_by_status, count_videos, find_video, reset_validation_state, update_properties_by_file,
};
pub use migrations::run_migrations;
pub use models::{ContentReference, ValidationStatus, ValidationUpdate, VideoCandidate, VideoRecord};
pub use page_tree::{allowed_page_ids, page_tree_ids};
pub use pool::{init_db_pool_with_path, DbPool};
pub use references::has_active_reference;
pub use selection::{select_for_report, select_for_validation, Cutoff, SelectionSettings};

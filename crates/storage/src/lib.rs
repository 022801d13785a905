//! StorySnaps on-device persistence
//!
//! Two stores live side by side under one app-private directory:
//!
//! ```text
//! {data_dir}/
//! ├── stories.json        # Catalog: JSON array of every story
//! └── SS_Images/
//!     └── {id}_page{n}.jpg  # One blob per page
//! ```
//!
//! - [`CatalogStore`] reads and writes the whole catalog in one operation.
//!   It has no locking of its own; callers serialize read-modify-write.
//! - [`BlobStore`] writes one image per page under a caller-chosen name.
//!
//! Both stores write through a temporary sibling and an atomic rename, so a
//! reader never observes a half-written file.

mod atomic;
pub mod blob;
pub mod catalog;
pub mod layout;

pub use blob::{page_blob_name, BlobStore};
pub use catalog::{CatalogLoad, CatalogStore};
pub use layout::StorageLayout;

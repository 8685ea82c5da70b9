//! File management module.
//!
//! This module provides the storage side of the service:
//! - Path resolution confined to a single storage root
//! - Directory listing and download lookup
//! - Atomic upload writes through temporary files

mod catalog;
mod resolver;
mod storage;

pub use catalog::{FileCatalog, FileEntry, Listing};
pub use resolver::{PathResolver, ResolvedPath, MAX_COMPONENT_LENGTH, MAX_PATH_LENGTH};
pub use storage::{is_temp_file_name, AtomicWriter, TEMP_FILE_PREFIX, TEMP_FILE_SUFFIX};


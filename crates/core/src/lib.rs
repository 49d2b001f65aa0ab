//! Gallery core: tree navigation over a bookmark store, link/image
//! classification, and image resolution across hosting schemes.

pub mod bootstrap;
pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod navigator;
pub mod recognizers;
pub mod resolver;
pub mod still_frame;
pub mod tree;

pub use classifier::{classify, Classification, EventKind, GalleryEvent};
pub use error::GalleryError;
pub use models::{ImageDescriptor, NavigationCursor};
pub use navigator::{directory_from_query, DirectoryView, Gallery};
pub use resolver::Resolver;
pub use tree::{find_adjacent_directory, ScanOrder, TreeProvider};

//! On-disk layout of externalized channels and code-template libraries

mod channel;
mod library;
mod marker;

pub use channel::{ConnectorFile, channel_file_tree, destination_slugs};
pub use library::{LibraryFile, library_file_tree, read_library};
pub use marker::{SEQUENCE_MARKER, TEMPLATE_MARKER, read_marker, with_marker};

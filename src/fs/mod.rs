pub mod reader;
pub mod tree;

pub use reader::{ChildInfo, DirectoryReader, FsReader, ReadError, ReadErrorKind, SortBy};
pub use tree::{flatten, Entry, EntryKind, ExpansionSet};

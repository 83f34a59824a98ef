mod host_fs;
mod mock_file;
mod mock_fs;
mod node;
mod tree;

pub use host_fs::{HostFS, HostFile};
pub use mock_file::MockFile;
pub use mock_fs::{FsConfig, MockFS};
pub use node::{Children, EntryType, Node};

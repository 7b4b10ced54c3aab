#![forbid(unsafe_code)]

pub mod compress;
pub mod error;
pub mod fsio;
pub mod registry;
pub mod tree;

// Re-export commonly used types at crate root
pub use registry::{
    FileClass, FileRecord, FileRegistry, LogNaming, NamingPolicy, RegistryError,
    run_shutdown_sweeps,
};
pub use tree::{DeleteMode, FolderSpec, SpecNode, TreeError, create_tree, delete_tree};

#[cfg(feature = "async")]
pub use compress::gzip_file_async;

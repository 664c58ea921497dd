//! CLI commands implementation

pub mod extract;
pub mod ingest;
pub mod init;
pub mod path;

pub use extract::*;
pub use ingest::*;
pub use init::*;
pub use path::*;

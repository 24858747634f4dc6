pub mod text_file;
pub mod workspace;

pub use text_file::TextFile;
pub use workspace::{Workspace, WorkspaceError, SIDECAR_DIR};

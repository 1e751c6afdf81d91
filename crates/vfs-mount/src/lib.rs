//! The mount router (spec §4.5, C7): longest-prefix mount resolution, path
//! translation, `Mount`/`Unmount`/`close` lifecycle, and the `Vfs` facade
//! user code drives.

mod table;
mod vfs;

pub use table::MountTable;
pub use vfs::Vfs;

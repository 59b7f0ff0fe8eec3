mod clean;
pub mod command;
pub mod invoke;
mod watcher;

pub use clean::clean;
pub use command::{CommandSpec, TbMode};
pub use invoke::{BuildOptions, InvokeError, build_and_run, build_design};
pub use watcher::watch;

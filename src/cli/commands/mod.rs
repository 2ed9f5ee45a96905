mod command_result;
pub mod diff;
pub mod extract;
pub mod helper;
pub mod init;
pub mod reconcile;
pub mod translate;

pub use command_result::*;

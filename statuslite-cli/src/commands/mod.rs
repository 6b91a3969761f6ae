pub mod init;
pub mod services;

pub use init::run_init;
pub use services::{run_add, run_check, run_cycle, run_list, run_remove, run_reset, run_status};

pub mod cron;
pub mod edit;
pub mod freeze;
pub mod init;
pub mod remove;
pub mod thaw;

pub mod admin;
pub mod chat;
pub mod files;
pub mod init;
pub mod presence;
pub mod watch;

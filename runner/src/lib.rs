pub mod init;
pub mod scene;

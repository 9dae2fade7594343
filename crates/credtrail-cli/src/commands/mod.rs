pub mod audit;
pub mod init;
pub mod issue;
pub mod revoke;
pub mod verify;

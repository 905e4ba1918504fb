pub mod alert;
pub mod channels;
pub mod init_db;
pub mod run;

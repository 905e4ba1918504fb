pub mod channels;
pub mod host;
pub mod jobs;
pub mod persistence;

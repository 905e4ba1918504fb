pub mod command;

pub use command::{CommandError, CommandJob};

mod args;

pub use args::{Cli, Command, ConnectionArgs, IdCommand, ParseArgs, StateCommand};

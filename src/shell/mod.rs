/// Interactive shell
///
/// A [`Session`] runs one turn at a time against a single context; [`Repl`]
/// feeds it lines from a reader.

pub mod render;
pub mod repl;
pub mod session;

pub use repl::Repl;
pub use session::{Session, TurnOutcome};

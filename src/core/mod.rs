/// Core functionality modules
///
/// The directory collaborator, and recording and searching of the persisted
/// command history.

pub mod directory;
pub mod recorder;
pub mod searcher;

pub use directory::{Directory, DirectoryError, DirectoryOutcome, DryRunDirectory};
pub use recorder::Recorder;
pub use searcher::Searcher;

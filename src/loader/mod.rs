pub mod package;
pub mod progress;
pub mod registry;

pub use package::PackageLoader;
pub use progress::{LoadProgress, LoadStage, ProgressCallback};
pub use registry::{LoadedModel, Registry};

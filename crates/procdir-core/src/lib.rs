pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs;
pub mod materializer;
pub mod model;
pub mod placement;
pub mod platform;
pub mod progress;
pub mod query;
pub mod scanner;
pub mod storage;
pub mod validator;

pub use config::{AppConfig, AreaRoots};
pub use engine::ProcessArchive;
pub use error::{Error, PlacementError};
pub use model::{Area, ProcessRecord, ProcessRequest, Service};
pub use placement::{PlacementOutcome, PlacementPolicy, PlacementReport, Transfer, UploadFile};
pub use progress::{ProgressReporter, SilentReporter};
pub use query::ProcessFilter;

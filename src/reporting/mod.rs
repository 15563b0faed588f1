pub mod snapshot;

pub use snapshot::{display_report, ModelSnapshot};

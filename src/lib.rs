pub mod config;
pub mod constants;
pub mod errors;
pub mod model;
pub mod record;
pub mod reporting;
pub mod sync;

pub use config::{ModelConfig, PhysicalConstants, Strictness};
pub use constants::*;
pub use errors::{ComputeError, ModelError};
pub use model::aerodynamics::{Aerodynamics, FlightContext};
pub use model::atmosphere::Atmosphere;
pub use model::environment::{Environment, EnvironmentBuilder};
pub use model::field::{Component, Field, FieldKind, FieldValue};
pub use model::inertia::Inertia;
pub use model::propulsion::PropulsionSystem;
pub use model::surface::{Surface, SurfaceAddresses};

// Re-export the record layer
pub use record::{CellAddress, CellRecord, CsvSheet, MemoryRecord, RecordError};

// Re-export commonly used items from sync and reporting
pub use reporting::ModelSnapshot;
pub use sync::{SyncIssue, SyncReport, ValidationOutcome};

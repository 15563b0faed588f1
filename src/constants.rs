// Physical Constants
pub const GRAVITY: f64 = 9.80665; // m/s²
pub const SPECIFIC_GAS_CONSTANT: f64 = 287.05; // J/(kg⋅K), dry air

// Environmental Constants
pub const TROPOSPHERE_LAPSE_RATE: f64 = 0.0065; // K per meter

// Propulsion Constants
pub const GRAMS_PER_KILOGRAM: f64 = 1000.0;

// Synchronization Parameters
pub const RECONCILIATION_TOLERANCE: f64 = 1e-10; // absolute
pub const CRUISE_SPEED_CELL: &str = "I16";
pub const WORKSHEET_PREFIX: &str = "plane";

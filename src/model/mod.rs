pub mod aerodynamics;
pub mod atmosphere;
pub mod environment;
pub mod field;
pub mod inertia;
pub mod propulsion;
pub mod surface;

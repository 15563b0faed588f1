use log::{debug, info, warn};

use super::aerodynamics::{Aerodynamics, FlightContext};
use super::atmosphere::Atmosphere;
use super::field::{Component, Field, FieldKind};
use super::inertia::Inertia;
use super::propulsion::PropulsionSystem;
use super::surface::Surface;
use crate::config::{ModelConfig, Strictness};
use crate::constants::CRUISE_SPEED_CELL;
use crate::errors::ModelError;
use crate::record::CellRecord;
use crate::sync::reconcile::{
    check_derived, load_field, load_inputs, push_field, push_inputs,
};
use crate::sync::{SyncReport, ValidationOutcome};

const LABEL: &str = "environment";

/// Owns every entity of the aircraft model and keeps it synchronized with
/// the bound record.
///
/// Entities are recomputed in a fixed order (see [`Environment::recompute`]);
/// calling an entity's own update out of that order leaves stale values with
/// no detection. One `Environment` is driven by one caller at a time.
#[derive(Debug)]
pub struct Environment<R: CellRecord> {
    pub wing: Surface,
    pub stabilizer: Surface,
    pub fin: Surface,
    pub atmosphere: Atmosphere,
    pub propulsion: PropulsionSystem,
    pub inertia: Inertia,
    pub aerodynamics: Aerodynamics,
    cruise_speed: Field,
    config: ModelConfig,
    record: R,
}

#[derive(Debug)]
pub struct EnvironmentBuilder<R> {
    record: Option<R>,
    config: ModelConfig,
}

impl<R: CellRecord> Default for EnvironmentBuilder<R> {
    fn default() -> Self {
        EnvironmentBuilder {
            record: None,
            config: ModelConfig::default(),
        }
    }
}

impl<R: CellRecord> EnvironmentBuilder<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, record: R) -> Self {
        self.record = Some(record);
        self
    }

    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Environment<R>, ModelError> {
        let record = self.record.ok_or(ModelError::MissingBinding)?;
        self.config.validate()?;

        Ok(Environment {
            wing: Surface::wing(),
            stabilizer: Surface::stabilizer(),
            fin: Surface::fin(),
            atmosphere: Atmosphere::new(),
            propulsion: PropulsionSystem::new(),
            inertia: Inertia::new(),
            aerodynamics: Aerodynamics::new(),
            cruise_speed: Field::input(LABEL, "cruise_speed", CRUISE_SPEED_CELL),
            config: self.config,
            record,
        })
    }
}

impl<R: CellRecord> Environment<R> {
    pub fn builder() -> EnvironmentBuilder<R> {
        EnvironmentBuilder::new()
    }

    pub fn new(record: R, config: ModelConfig) -> Result<Self, ModelError> {
        Self::builder().record(record).config(config).build()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    /// Direct access to the bound record, as an out-of-band editor has.
    pub fn record_mut(&mut self) -> &mut R {
        &mut self.record
    }

    pub fn into_record(self) -> R {
        self.record
    }

    pub fn cruise_speed(&self) -> &Field {
        &self.cruise_speed
    }

    pub fn set_cruise_speed(&mut self, cruise_speed: f64) {
        self.cruise_speed.set(cruise_speed);
        self.aerodynamics
            .set_cruise_speed(self.cruise_speed.value().clone());
    }

    /// Sets the wing area shared by the wing and the aerodynamics (C37).
    pub fn set_wing_area(&mut self, wing_area: f64) {
        self.wing.stored_area.set(wing_area);
        self.aerodynamics
            .set_wing_surface_area(self.wing.stored_area.value().clone());
    }

    /// Every entity, in recomputation order.
    pub fn components(&self) -> [&dyn Component; 7] {
        [
            &self.wing,
            &self.stabilizer,
            &self.fin,
            &self.atmosphere,
            &self.propulsion,
            &self.inertia,
            &self.aerodynamics,
        ]
    }

    /// Looks a field up by entity label and field name. The shared cruise
    /// speed is `environment.cruise_speed`.
    pub fn field(&self, component: &str, name: &str) -> Option<&Field> {
        if component == LABEL {
            return (name == self.cruise_speed.name()).then_some(&self.cruise_speed);
        }
        self.components()
            .into_iter()
            .find(|c| c.label() == component)
            .and_then(|c| c.field(name))
    }

    /// Overrides one input value, as an external caller may. Derived fields
    /// are refused. Either name of a shared value sets the value itself.
    pub fn set_input(&mut self, component: &str, name: &str, value: f64) -> Result<(), ModelError> {
        match (component, name) {
            (LABEL | "aerodynamics", "cruise_speed") => {
                self.set_cruise_speed(value);
                return Ok(());
            }
            ("wing", "stored_area") | ("aerodynamics", "wing_surface_area") => {
                self.set_wing_area(value);
                return Ok(());
            }
            _ => {}
        }

        let qualified = format!("{component}.{name}");
        let field = match component {
            "wing" => self.wing.field_mut(name),
            "stabilizer" => self.stabilizer.field_mut(name),
            "fin" => self.fin.field_mut(name),
            "atmosphere" => self.atmosphere.field_mut(name),
            "propulsion" => self.propulsion.field_mut(name),
            "inertia" => self.inertia.field_mut(name),
            "aerodynamics" => self.aerodynamics.field_mut(name),
            _ => None,
        }
        .ok_or_else(|| ModelError::UnknownField(qualified.clone()))?;

        if field.kind() != FieldKind::Input {
            return Err(ModelError::NotAnInput(qualified));
        }
        field.set(value);
        Ok(())
    }

    /// One full pass over the equations:
    ///
    /// 1. wing, stabilizer, fin: aspect ratio, then volume
    /// 2. atmosphere: temperature, then density
    /// 3. propulsion: efficiency at the shared cruise speed, then thrust
    /// 4. inertia: surface masses, then total mass
    /// 5. aerodynamics, after receiving the shared cruise speed and wing area
    /// 6. aerodynamics hands its power figures back to inertia
    ///
    /// A computation whose operands have no value is reported and the pass
    /// goes on.
    pub fn recompute(&mut self) -> SyncReport {
        debug!("Recomputing derived fields");
        let constants = self.config.constants;
        let mut errors = Vec::new();

        errors.extend(self.wing.update());
        errors.extend(self.stabilizer.update());
        errors.extend(self.fin.update());
        errors.extend(self.atmosphere.update(&constants));
        errors.extend(self.propulsion.update(&self.cruise_speed, &constants));
        errors.extend(
            self.inertia
                .update(&self.wing, &self.stabilizer, &self.fin),
        );

        self.aerodynamics
            .set_cruise_speed(self.cruise_speed.value().clone());
        self.aerodynamics
            .set_wing_surface_area(self.wing.stored_area.value().clone());
        errors.extend(self.aerodynamics.update(FlightContext {
            atmosphere: &self.atmosphere,
            inertia: &self.inertia,
            propulsion: &self.propulsion,
            constants: &constants,
        }));
        self.aerodynamics.push_power_to_inertia(&mut self.inertia);

        let mut report = SyncReport::new();
        for error in errors {
            report.push(error);
        }
        report
    }

    /// Reads every input from the record, recomputes, then checks every
    /// derived value the record holds.
    pub fn load(&mut self) -> SyncReport {
        info!("Loading model inputs from record");
        let mut report = SyncReport::new();

        let Environment {
            wing,
            stabilizer,
            fin,
            atmosphere,
            propulsion,
            inertia,
            aerodynamics,
            cruise_speed,
            record,
            ..
        } = &mut *self;
        load_field(cruise_speed, &*record, &mut report);
        let components: [&mut dyn Component; 7] =
            [wing, stabilizer, fin, atmosphere, propulsion, inertia, aerodynamics];
        for component in components {
            load_inputs(component, &*record, &mut report);
        }

        report.merge(self.recompute());
        self.check_all(&mut report);
        report
    }

    /// Writes every input to the record and checks every derived value
    /// against it. Derived values are never written, and never overwritten.
    pub fn push(&mut self) -> SyncReport {
        info!("Pushing model inputs to record");
        let mut report = SyncReport::new();

        push_field(&self.cruise_speed, &mut self.record, &mut report);
        let components: [&dyn Component; 7] = [
            &self.wing,
            &self.stabilizer,
            &self.fin,
            &self.atmosphere,
            &self.propulsion,
            &self.inertia,
            &self.aerodynamics,
        ];
        for component in components {
            push_inputs(component, &mut self.record, &mut report);
        }

        self.check_all(&mut report);
        report
    }

    /// Recomputes and pushes. Success follows the configured strictness:
    /// `Lenient` always passes, `Strict` passes only on a clean report.
    pub fn validate(&mut self) -> ValidationOutcome {
        let mut report = self.recompute();
        report.merge(self.push());

        let passed = match self.config.strictness {
            Strictness::Lenient => true,
            Strictness::Strict => report.is_clean(),
        };
        if report.is_clean() {
            info!("Validation passed with no issues");
        } else {
            warn!("Validation finished with {report}");
        }
        ValidationOutcome { passed, report }
    }

    fn check_all(&self, report: &mut SyncReport) {
        let tolerance = self.config.tolerance;
        for component in self.components() {
            check_derived(component, &self.record, tolerance, report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field::FieldValue;
    use crate::record::MemoryRecord;
    use crate::sync::SyncIssue;

    fn create_test_environment() -> Environment<MemoryRecord> {
        let record = MemoryRecord::from_cells([
            ("I16", "15"),
            ("C31", "1.2"),
            ("C32", "0.3"),
            ("C33", "0.15"),
            ("E30", "0.7"),
            ("C37", "0.27"),
            ("C45", "0.4"),
            ("C46", "0.15"),
            ("C47", "0.1"),
            ("E44", "0.5"),
            ("C59", "0.2"),
            ("C60", "0.15"),
            ("C61", "0.08"),
            ("E58", "0.5"),
            ("I30", "500"),
            ("I34", "1.225"),
            ("I35", "288.15"),
            ("I4", "0.8"),
            ("I7", "4"),
            ("I8", "200"),
            ("K9", "500"),
            ("I3", "199800"),
            ("I5", "0.85"),
            ("D4", "40"),
            ("C7", "0.12"),
            ("C8", "0.02"),
            ("C9", "0.35"),
            ("C10", "0.04"),
            ("C11", "0.08"),
            ("C12", "0.3"),
            ("C13", "0.25"),
            ("I18", "0.6"),
            ("I19", "0.05"),
        ])
        .unwrap();
        Environment::new(record, ModelConfig::default()).unwrap()
    }

    #[test]
    fn test_missing_binding_is_fatal() {
        let result = Environment::<MemoryRecord>::builder().build();
        assert!(matches!(result, Err(ModelError::MissingBinding)));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let config = ModelConfig {
            tolerance: -1.0,
            ..ModelConfig::default()
        };
        let result = Environment::new(MemoryRecord::new(), config);
        assert!(matches!(result, Err(ModelError::ConfigError(_))));
    }

    #[test]
    fn test_load_without_derived_cells_is_clean() {
        let mut env = create_test_environment();
        let report = env.load();
        assert!(report.is_clean(), "{:?}", report.issues());

        assert_eq!(env.cruise_speed().get(), Some(15.0));
        assert_eq!(env.aerodynamics.cruise_speed.get(), Some(15.0));
        assert_eq!(env.wing.aspect_ratio.get(), Some(4.0));
        assert!(env.aerodynamics.endurance.get().is_some());
    }

    #[test]
    fn test_feedback_edge() {
        let mut env = create_test_environment();
        env.load();

        assert_eq!(
            env.inertia.power_required.get(),
            env.aerodynamics.power_required.get()
        );
        assert_eq!(
            env.inertia.power_available.get(),
            env.aerodynamics.power_available.get()
        );
        assert!(env.inertia.power_required.get().is_some());
    }

    #[test]
    fn test_cruise_speed_reaches_propulsion() {
        let mut env = create_test_environment();
        env.load();
        env.set_cruise_speed(20.0);
        env.recompute();

        assert_eq!(env.propulsion.propulsive_efficiency.get(), Some(4.0 * 20.0 / 200.0));
        assert_eq!(env.aerodynamics.cruise_speed.get(), Some(20.0));
    }

    #[test]
    fn test_missing_cruise_speed_is_reported() {
        let mut env = create_test_environment();
        env.record_mut().set_raw("I16", "").unwrap();
        let report = env.load();

        assert!(report.compute_failures() > 0);
        assert!(report.issues().iter().any(|issue| matches!(
            issue,
            SyncIssue::Compute(crate::errors::ComputeError::MissingInput {
                component: "environment",
                field: "cruise_speed"
            })
        )));
        assert!(matches!(env.aerodynamics.lift.value(), FieldValue::Invalid(_)));
    }

    #[test]
    fn test_set_input() {
        let mut env = create_test_environment();
        env.set_input("wing", "span", 1.5).unwrap();
        assert_eq!(env.wing.span.get(), Some(1.5));

        assert!(matches!(
            env.set_input("wing", "volume", 1.0),
            Err(ModelError::NotAnInput(_))
        ));
        assert!(matches!(
            env.set_input("tail", "span", 1.0),
            Err(ModelError::UnknownField(_))
        ));

        env.set_input("environment", "cruise_speed", 18.0).unwrap();
        assert_eq!(env.field("environment", "cruise_speed").unwrap().get(), Some(18.0));
    }

    #[test]
    fn test_shared_cruise_speed_cell() {
        let mut env = create_test_environment();
        env.record_mut().set_raw("I16", "fast").unwrap();
        env.set_cruise_speed(15.0);
        let report = env.load();
        assert_eq!(report.io_errors(), 1);

        env.set_input("aerodynamics", "cruise_speed", 20.0).unwrap();
        assert_eq!(env.cruise_speed().get(), Some(20.0));
        assert_eq!(env.aerodynamics.cruise_speed.get(), Some(20.0));

        env.push();
        assert_eq!(env.record().raw("I16"), Some("20"));
        let writes = env
            .record()
            .writes()
            .iter()
            .filter(|(address, _)| address.to_string() == "I16")
            .count();
        assert_eq!(writes, 1);
    }

    #[test]
    fn test_shared_wing_area_cell() {
        let mut env = create_test_environment();
        env.load();
        assert_eq!(env.aerodynamics.wing_surface_area.get(), Some(0.27));

        env.set_input("wing", "stored_area", 0.35).unwrap();
        assert_eq!(env.aerodynamics.wing_surface_area.get(), Some(0.35));
        env.push();
        assert_eq!(env.record().raw("C37"), Some("0.35"));

        env.set_input("aerodynamics", "wing_surface_area", 0.4).unwrap();
        assert_eq!(env.wing.stored_area.get(), Some(0.4));
        env.recompute();
        env.push();
        assert_eq!(env.record().raw("C37"), Some("0.4"));
        assert_eq!(env.aerodynamics.wing_surface_area.get(), Some(0.4));
    }

    #[test]
    fn test_borrowed_record() {
        let mut record = MemoryRecord::from_cells([("I16", "12")]).unwrap();
        {
            let mut env = Environment::new(&mut record, ModelConfig::default()).unwrap();
            env.load();
            env.set_cruise_speed(14.0);
            env.push();
        }
        assert_eq!(record.raw("I16"), Some("14"));
    }

    #[test]
    fn test_field_lookup() {
        let env = create_test_environment();
        assert_eq!(env.field("fin", "volume").unwrap().address(), Some("E6"));
        assert!(env.field("fin", "nothing").is_none());
        assert!(env.field("environment", "span").is_none());
    }
}

use super::atmosphere::Atmosphere;
use super::field::{Component, Field, FieldValue};
use super::inertia::Inertia;
use super::propulsion::PropulsionSystem;
use crate::config::PhysicalConstants;
use crate::errors::ComputeError;

const LABEL: &str = "aerodynamics";

/// Sibling entities the aerodynamics pass reads, borrowed for one update.
#[derive(Debug, Clone, Copy)]
pub struct FlightContext<'a> {
    pub atmosphere: &'a Atmosphere,
    pub inertia: &'a Inertia,
    pub propulsion: &'a PropulsionSystem,
    pub constants: &'a PhysicalConstants,
}

/// Steady level cruise.
#[derive(Debug, Clone)]
pub struct Aerodynamics {
    /// Copy of the environment's cruise speed (I16), refreshed before every pass.
    pub cruise_speed: Field,
    pub lift_coefficient: Field,
    pub drag_coefficient: Field,
    /// Copy of the wing's stored area (C37), refreshed before every pass.
    pub wing_surface_area: Field,
    pub lift: Field,
    pub drag: Field,
    pub weight: Field,
    pub power_required: Field,
    pub thrust: Field,
    pub power_available: Field,
    /// Seconds of flight on one battery at cruise throttle.
    pub endurance: Field,
}

impl Default for Aerodynamics {
    fn default() -> Self {
        Self::new()
    }
}

impl Aerodynamics {
    pub fn new() -> Self {
        Aerodynamics {
            cruise_speed: Field::copy(LABEL, "cruise_speed"),
            lift_coefficient: Field::input(LABEL, "lift_coefficient", "I18"),
            drag_coefficient: Field::input(LABEL, "drag_coefficient", "I19"),
            wing_surface_area: Field::copy(LABEL, "wing_surface_area"),
            lift: Field::derived(LABEL, "lift", "I21"),
            drag: Field::derived(LABEL, "drag", "I23"),
            weight: Field::derived(LABEL, "weight", "I22"),
            power_required: Field::derived(LABEL, "power_required", "I17"),
            thrust: Field::derived(LABEL, "thrust", "I20"),
            power_available: Field::derived(LABEL, "power_available", "I12"),
            endurance: Field::derived(LABEL, "endurance", "I26"),
        }
    }

    pub fn update_lift(&mut self, atmosphere: &Atmosphere) -> Result<(), ComputeError> {
        let lift = self
            .force_scale(atmosphere)
            .and_then(|scale| Ok(scale * self.lift_coefficient.require()?));
        self.lift.store(lift)
    }

    pub fn update_drag(&mut self, atmosphere: &Atmosphere) -> Result<(), ComputeError> {
        let drag = self
            .force_scale(atmosphere)
            .and_then(|scale| Ok(scale * self.drag_coefficient.require()?));
        self.drag.store(drag)
    }

    pub fn update_weight(
        &mut self,
        inertia: &Inertia,
        constants: &PhysicalConstants,
    ) -> Result<(), ComputeError> {
        let weight = inertia.total_mass.require().map(|mass| mass * constants.gravity);
        self.weight.store(weight)
    }

    pub fn update_power_required(&mut self) -> Result<(), ComputeError> {
        let power = self.power_at_cruise(&self.drag);
        self.power_required.store(power)
    }

    /// Static thrust, taken as-is from the propulsion system.
    pub fn update_thrust(&mut self, propulsion: &PropulsionSystem) -> Result<(), ComputeError> {
        self.thrust.store(propulsion.thrust.require())
    }

    pub fn update_power_available(&mut self) -> Result<(), ComputeError> {
        let power = self.power_at_cruise(&self.thrust);
        self.power_available.store(power)
    }

    /// Zero throttle or power draw stores an infinite endurance.
    pub fn update_endurance(&mut self, propulsion: &PropulsionSystem) -> Result<(), ComputeError> {
        let endurance = Self::calculate_endurance(propulsion);
        self.endurance.store(endurance)
    }

    /// Runs every computation in dependency order.
    pub fn update(&mut self, context: FlightContext<'_>) -> Vec<ComputeError> {
        [
            self.update_lift(context.atmosphere),
            self.update_drag(context.atmosphere),
            self.update_weight(context.inertia, context.constants),
            self.update_power_required(),
            self.update_thrust(context.propulsion),
            self.update_power_available(),
            self.update_endurance(context.propulsion),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }

    /// The single feedback edge of the model: hands the power figures of this
    /// pass to the inertia model.
    pub fn push_power_to_inertia(&self, inertia: &mut Inertia) {
        match (self.power_required.get(), self.power_available.get()) {
            (Some(required), Some(available)) => inertia.set_power_numbers(required, available),
            _ => inertia.mirror_power(self.power_required.value(), self.power_available.value()),
        }
    }

    pub fn set_cruise_speed(&mut self, cruise_speed: FieldValue) {
        self.cruise_speed.assign(cruise_speed);
    }

    pub fn set_wing_surface_area(&mut self, wing_surface_area: FieldValue) {
        self.wing_surface_area.assign(wing_surface_area);
    }

    /// Dynamic pressure times wing area.
    fn force_scale(&self, atmosphere: &Atmosphere) -> Result<f64, ComputeError> {
        let density = atmosphere.density_at_cruise.require()?;
        let speed = self.cruise_speed.require()?;
        Ok(0.5 * density * speed.powi(2) * self.wing_surface_area.require()?)
    }

    fn power_at_cruise(&self, force: &Field) -> Result<f64, ComputeError> {
        Ok(force.require()? * self.cruise_speed.require()?)
    }

    fn calculate_endurance(propulsion: &PropulsionSystem) -> Result<f64, ComputeError> {
        let draw = propulsion.motor_power_draw.require()? * propulsion.cruise_throttle.require()?;
        Ok(propulsion.battery_energy.require()? / draw)
    }
}

impl Component for Aerodynamics {
    fn label(&self) -> &'static str {
        LABEL
    }

    fn fields(&self) -> Vec<&Field> {
        vec![
            &self.cruise_speed,
            &self.lift_coefficient,
            &self.drag_coefficient,
            &self.wing_surface_area,
            &self.lift,
            &self.drag,
            &self.weight,
            &self.power_required,
            &self.thrust,
            &self.power_available,
            &self.endurance,
        ]
    }

    fn fields_mut(&mut self) -> Vec<&mut Field> {
        vec![
            &mut self.cruise_speed,
            &mut self.lift_coefficient,
            &mut self.drag_coefficient,
            &mut self.wing_surface_area,
            &mut self.lift,
            &mut self.drag,
            &mut self.weight,
            &mut self.power_required,
            &mut self.thrust,
            &mut self.power_available,
            &mut self.endurance,
        ]
    }
}

use super::field::{Component, Field};
use crate::config::PhysicalConstants;
use crate::constants::GRAMS_PER_KILOGRAM;
use crate::errors::ComputeError;

const LABEL: &str = "propulsion";

#[derive(Debug, Clone)]
pub struct PropulsionSystem {
    /// Cruise throttle setting, nominally in [0, 1]; not range-checked.
    pub cruise_throttle: Field,
    /// Motor efficiency, g/W.
    pub motor_efficiency_rate: Field,
    /// Electrical power draw at full throttle, W.
    pub motor_power_draw: Field,
    /// Static thrust at full throttle, g.
    pub static_thrust_rating: Field,
    /// Usable battery energy, J.
    pub battery_energy: Field,
    pub battery_efficiency: Field,
    pub propulsive_efficiency: Field,
    /// Static thrust at the cruise throttle, N.
    pub thrust: Field,
}

impl Default for PropulsionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl PropulsionSystem {
    pub fn new() -> Self {
        PropulsionSystem {
            cruise_throttle: Field::input(LABEL, "cruise_throttle", "I4"),
            motor_efficiency_rate: Field::input(LABEL, "motor_efficiency_rate", "I7"),
            motor_power_draw: Field::input(LABEL, "motor_power_draw", "I8"),
            static_thrust_rating: Field::input(LABEL, "static_thrust_rating", "K9"),
            battery_energy: Field::input(LABEL, "battery_energy", "I3"),
            battery_efficiency: Field::input(LABEL, "battery_efficiency", "I5"),
            propulsive_efficiency: Field::derived(LABEL, "propulsive_efficiency", "I6"),
            thrust: Field::derived(LABEL, "thrust", "I10"),
        }
    }

    pub fn update_propulsive_efficiency(&mut self, cruise_speed: f64) -> Result<(), ComputeError> {
        let efficiency = self.calculate_propulsive_efficiency(cruise_speed);
        self.propulsive_efficiency.store(efficiency)
    }

    pub fn update_thrust(&mut self, constants: &PhysicalConstants) -> Result<(), ComputeError> {
        let thrust = self.calculate_thrust(constants.gravity);
        self.thrust.store(thrust)
    }

    /// Runs both computations. `cruise_speed` is the environment's shared
    /// field; when it has no value the efficiency is invalidated instead.
    pub fn update(
        &mut self,
        cruise_speed: &Field,
        constants: &PhysicalConstants,
    ) -> Vec<ComputeError> {
        let efficiency = match cruise_speed.require() {
            Ok(speed) => self.update_propulsive_efficiency(speed),
            Err(error) => self.propulsive_efficiency.store(Err(error)),
        };

        [efficiency, self.update_thrust(constants)]
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }

    fn calculate_propulsive_efficiency(&self, cruise_speed: f64) -> Result<f64, ComputeError> {
        Ok(self.motor_efficiency_rate.require()? * cruise_speed / self.motor_power_draw.require()?)
    }

    fn calculate_thrust(&self, gravity: f64) -> Result<f64, ComputeError> {
        let throttle = self.cruise_throttle.require()?;
        let kg_equivalent =
            self.static_thrust_rating.require()? * throttle.powi(2) / GRAMS_PER_KILOGRAM;
        Ok(kg_equivalent * gravity)
    }
}

impl Component for PropulsionSystem {
    fn label(&self) -> &'static str {
        LABEL
    }

    fn fields(&self) -> Vec<&Field> {
        vec![
            &self.cruise_throttle,
            &self.motor_efficiency_rate,
            &self.motor_power_draw,
            &self.static_thrust_rating,
            &self.battery_energy,
            &self.battery_efficiency,
            &self.propulsive_efficiency,
            &self.thrust,
        ]
    }

    fn fields_mut(&mut self) -> Vec<&mut Field> {
        vec![
            &mut self.cruise_throttle,
            &mut self.motor_efficiency_rate,
            &mut self.motor_power_draw,
            &mut self.static_thrust_rating,
            &mut self.battery_energy,
            &mut self.battery_efficiency,
            &mut self.propulsive_efficiency,
            &mut self.thrust,
        ]
    }
}

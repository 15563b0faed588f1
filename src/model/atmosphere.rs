use super::field::{Component, Field};
use crate::config::PhysicalConstants;
use crate::errors::ComputeError;

const LABEL: &str = "atmosphere";

/// International Standard Atmosphere, troposphere only.
#[derive(Debug, Clone)]
pub struct Atmosphere {
    pub cruise_height: Field,
    pub ref_density: Field,
    pub ref_temperature: Field,
    pub temperature_at_cruise: Field,
    pub density_at_cruise: Field,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self::new()
    }
}

impl Atmosphere {
    pub fn new() -> Self {
        Atmosphere {
            cruise_height: Field::input(LABEL, "cruise_height", "I30"),
            ref_density: Field::input(LABEL, "ref_density", "I34"),
            ref_temperature: Field::input(LABEL, "ref_temperature", "I35"),
            temperature_at_cruise: Field::derived(LABEL, "temperature_at_cruise", "I32"),
            density_at_cruise: Field::derived(LABEL, "density_at_cruise", "I31"),
        }
    }

    pub fn update_temperature_at_cruise(
        &mut self,
        constants: &PhysicalConstants,
    ) -> Result<(), ComputeError> {
        let temperature = self.ref_temperature.require().and_then(|ref_temperature| {
            Ok(ref_temperature - constants.lapse_rate * self.cruise_height.require()?)
        });
        self.temperature_at_cruise.store(temperature)
    }

    /// Must run after the temperature update. A zero reference temperature or
    /// a negative temperature ratio stores NaN.
    pub fn update_density_at_cruise(
        &mut self,
        constants: &PhysicalConstants,
    ) -> Result<(), ComputeError> {
        let density = self.calculate_density(constants.density_exponent());
        self.density_at_cruise.store(density)
    }

    pub fn update(&mut self, constants: &PhysicalConstants) -> Vec<ComputeError> {
        [
            self.update_temperature_at_cruise(constants),
            self.update_density_at_cruise(constants),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }

    fn calculate_density(&self, exponent: f64) -> Result<f64, ComputeError> {
        let ratio = self.temperature_at_cruise.require()? / self.ref_temperature.require()?;
        Ok(self.ref_density.require()? * ratio.powf(exponent))
    }
}

impl Component for Atmosphere {
    fn label(&self) -> &'static str {
        LABEL
    }

    fn fields(&self) -> Vec<&Field> {
        vec![
            &self.cruise_height,
            &self.ref_density,
            &self.ref_temperature,
            &self.temperature_at_cruise,
            &self.density_at_cruise,
        ]
    }

    fn fields_mut(&mut self) -> Vec<&mut Field> {
        vec![
            &mut self.cruise_height,
            &mut self.ref_density,
            &mut self.ref_temperature,
            &mut self.temperature_at_cruise,
            &mut self.density_at_cruise,
        ]
    }
}

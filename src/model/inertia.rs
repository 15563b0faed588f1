use super::field::{Component, Field, FieldValue};
use super::surface::Surface;
use crate::errors::ComputeError;

const LABEL: &str = "inertia";

/// Mass breakdown of the airframe. Surface masses scale with the internal
/// volume of each lifting surface.
#[derive(Debug, Clone)]
pub struct Inertia {
    /// Structural density, kg/m³.
    pub structural_density: Field,
    pub motor_mass: Field,
    pub propeller_mass: Field,
    pub battery_mass: Field,
    pub servos_mass: Field,
    pub electronics_mass: Field,
    pub fuselage_mass: Field,
    pub payload_mass: Field,
    pub wing_mass: Field,
    pub elevator_mass: Field,
    pub rudder_mass: Field,
    pub total_mass: Field,
    pub power_required: Field,
    pub power_available: Field,
}

impl Default for Inertia {
    fn default() -> Self {
        Self::new()
    }
}

impl Inertia {
    pub fn new() -> Self {
        Inertia {
            structural_density: Field::input(LABEL, "structural_density", "D4"),
            motor_mass: Field::input(LABEL, "motor_mass", "C7"),
            propeller_mass: Field::input(LABEL, "propeller_mass", "C8"),
            battery_mass: Field::input(LABEL, "battery_mass", "C9"),
            servos_mass: Field::input(LABEL, "servos_mass", "C10"),
            electronics_mass: Field::input(LABEL, "electronics_mass", "C11"),
            fuselage_mass: Field::input(LABEL, "fuselage_mass", "C12"),
            payload_mass: Field::input(LABEL, "payload_mass", "C13"),
            wing_mass: Field::derived(LABEL, "wing_mass", "C4"),
            elevator_mass: Field::derived(LABEL, "elevator_mass", "C5"),
            rudder_mass: Field::derived(LABEL, "rudder_mass", "C6"),
            total_mass: Field::derived(LABEL, "total_mass", "C14"),
            power_required: Field::derived(LABEL, "power_required", "I11"),
            power_available: Field::derived(LABEL, "power_available", "I12"),
        }
    }

    pub fn update_wing_mass(&mut self, wing: &Surface) -> Result<(), ComputeError> {
        let mass = self.surface_mass(wing);
        self.wing_mass.store(mass)
    }

    pub fn update_elevator_mass(&mut self, stabilizer: &Surface) -> Result<(), ComputeError> {
        let mass = self.surface_mass(stabilizer);
        self.elevator_mass.store(mass)
    }

    pub fn update_rudder_mass(&mut self, fin: &Surface) -> Result<(), ComputeError> {
        let mass = self.surface_mass(fin);
        self.rudder_mass.store(mass)
    }

    pub fn update_total_mass(&mut self) -> Result<(), ComputeError> {
        let total = self.calculate_total_mass();
        self.total_mass.store(total)
    }

    /// The surfaces' volumes must already be current for this pass.
    pub fn update(
        &mut self,
        wing: &Surface,
        stabilizer: &Surface,
        fin: &Surface,
    ) -> Vec<ComputeError> {
        [
            self.update_wing_mass(wing),
            self.update_elevator_mass(stabilizer),
            self.update_rudder_mass(fin),
            self.update_total_mass(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }

    /// Feedback from the aerodynamics pass. Overwrites on every call.
    pub fn set_power_numbers(&mut self, power_required: f64, power_available: f64) {
        self.power_required.set(power_required);
        self.power_available.set(power_available);
    }

    pub(crate) fn mirror_power(
        &mut self,
        power_required: &FieldValue,
        power_available: &FieldValue,
    ) {
        self.power_required.assign(power_required.clone());
        self.power_available.assign(power_available.clone());
    }

    fn surface_mass(&self, surface: &Surface) -> Result<f64, ComputeError> {
        Ok(self.structural_density.require()? * surface.volume.require()?)
    }

    fn mass_terms(&self) -> [&Field; 10] {
        [
            &self.wing_mass,
            &self.elevator_mass,
            &self.rudder_mass,
            &self.motor_mass,
            &self.propeller_mass,
            &self.battery_mass,
            &self.servos_mass,
            &self.electronics_mass,
            &self.fuselage_mass,
            &self.payload_mass,
        ]
    }

    fn calculate_total_mass(&self) -> Result<f64, ComputeError> {
        let masses = self
            .mass_terms()
            .into_iter()
            .map(Field::require)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(compensated_sum(&masses))
    }
}

/// Neumaier summation: the result does not drift with the order of the terms
/// beyond the last bit.
pub fn compensated_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for &value in values {
        let t = sum + value;
        if sum.abs() >= value.abs() {
            compensation += (sum - t) + value;
        } else {
            compensation += (value - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

impl Component for Inertia {
    fn label(&self) -> &'static str {
        LABEL
    }

    fn fields(&self) -> Vec<&Field> {
        vec![
            &self.structural_density,
            &self.motor_mass,
            &self.propeller_mass,
            &self.battery_mass,
            &self.servos_mass,
            &self.electronics_mass,
            &self.fuselage_mass,
            &self.payload_mass,
            &self.wing_mass,
            &self.elevator_mass,
            &self.rudder_mass,
            &self.total_mass,
            &self.power_required,
            &self.power_available,
        ]
    }

    fn fields_mut(&mut self) -> Vec<&mut Field> {
        vec![
            &mut self.structural_density,
            &mut self.motor_mass,
            &mut self.propeller_mass,
            &mut self.battery_mass,
            &mut self.servos_mass,
            &mut self.electronics_mass,
            &mut self.fuselage_mass,
            &mut self.payload_mass,
            &mut self.wing_mass,
            &mut self.elevator_mass,
            &mut self.rudder_mass,
            &mut self.total_mass,
            &mut self.power_required,
            &mut self.power_available,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::seq::SliceRandom;

    fn create_test_surface(volume: f64) -> Surface {
        let mut surface = Surface::wing();
        surface.volume.set(volume);
        surface
    }

    fn create_test_inertia() -> Inertia {
        let mut inertia = Inertia::new();
        inertia.structural_density.set(40.0);
        inertia.motor_mass.set(0.12);
        inertia.propeller_mass.set(0.02);
        inertia.battery_mass.set(0.35);
        inertia.servos_mass.set(0.04);
        inertia.electronics_mass.set(0.08);
        inertia.fuselage_mass.set(0.3);
        inertia.payload_mass.set(0.25);
        inertia
    }

    #[test]
    fn test_surface_masses() {
        let mut inertia = create_test_inertia();
        let errors = inertia.update(
            &create_test_surface(0.042525),
            &create_test_surface(0.004),
            &create_test_surface(0.002),
        );
        assert!(errors.is_empty());

        assert_abs_diff_eq!(inertia.wing_mass.get().unwrap(), 1.701, epsilon = 1e-12);
        assert_abs_diff_eq!(inertia.elevator_mass.get().unwrap(), 0.16, epsilon = 1e-12);
        assert_abs_diff_eq!(inertia.rudder_mass.get().unwrap(), 0.08, epsilon = 1e-12);
        assert_abs_diff_eq!(
            inertia.total_mass.get().unwrap(),
            1.701 + 0.16 + 0.08 + 1.16,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_total_mass_order_independent() {
        let mut inertia = create_test_inertia();
        inertia.update(
            &create_test_surface(0.042525),
            &create_test_surface(0.004),
            &create_test_surface(0.002),
        );
        let total = inertia.total_mass.get().unwrap();

        let mut terms: Vec<f64> = inertia
            .mass_terms()
            .into_iter()
            .map(|field| field.get().unwrap())
            .collect();
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            terms.shuffle(&mut rng);
            assert_abs_diff_eq!(compensated_sum(&terms), total, epsilon = f64::EPSILON * 4.0);
        }
    }

    #[test]
    fn test_compensated_sum_recovers_small_terms() {
        assert_eq!(compensated_sum(&[1.0, 1e100, 1.0, -1e100]), 2.0);
        assert_eq!(compensated_sum(&[]), 0.0);
    }

    #[test]
    fn test_missing_volume() {
        let mut inertia = create_test_inertia();
        let errors = inertia.update(
            &Surface::wing(),
            &create_test_surface(0.004),
            &create_test_surface(0.002),
        );

        // wing mass, then the total that reads it
        assert_eq!(errors.len(), 2);
        assert!(matches!(inertia.total_mass.value(), FieldValue::Invalid(_)));
        assert!(inertia.elevator_mass.get().is_some());
    }

    #[test]
    fn test_set_power_numbers_overwrites() {
        let mut inertia = Inertia::new();
        inertia.set_power_numbers(30.0, 40.0);
        inertia.set_power_numbers(31.0, 41.0);
        assert_eq!(inertia.power_required.get(), Some(31.0));
        assert_eq!(inertia.power_available.get(), Some(41.0));
    }
}

use super::field::{Component, Field};
use crate::errors::ComputeError;

/// Cell bindings of one lifting surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceAddresses {
    pub span: &'static str,
    pub root_chord: &'static str,
    pub tip_chord: &'static str,
    pub empirical_coefficient: &'static str,
    pub stored_area: &'static str,
    pub aspect_ratio: &'static str,
    pub volume: &'static str,
}

impl SurfaceAddresses {
    pub const WING: SurfaceAddresses = SurfaceAddresses {
        span: "C31",
        root_chord: "C32",
        tip_chord: "C33",
        empirical_coefficient: "E30",
        stored_area: "C37",
        aspect_ratio: "C38",
        volume: "E4",
    };

    pub const STABILIZER: SurfaceAddresses = SurfaceAddresses {
        span: "C45",
        root_chord: "C46",
        tip_chord: "C47",
        empirical_coefficient: "E44",
        stored_area: "C51",
        aspect_ratio: "C52",
        volume: "E5",
    };

    pub const FIN: SurfaceAddresses = SurfaceAddresses {
        span: "C59",
        root_chord: "C60",
        tip_chord: "C61",
        empirical_coefficient: "E58",
        stored_area: "C65",
        aspect_ratio: "C66",
        volume: "E6",
    };
}

/// A trapezoidal lifting surface: the wing, horizontal stabilizer or fin.
#[derive(Debug, Clone)]
pub struct Surface {
    label: &'static str,
    pub span: Field,
    pub root_chord: Field,
    pub tip_chord: Field,
    pub empirical_coefficient: Field,
    /// Area as recorded in the sheet; not used by any equation.
    pub stored_area: Field,
    pub aspect_ratio: Field,
    /// Internal volume, m³.
    pub volume: Field,
}

impl Surface {
    pub fn new(label: &'static str, addresses: SurfaceAddresses) -> Self {
        Surface {
            label,
            span: Field::input(label, "span", addresses.span),
            root_chord: Field::input(label, "root_chord", addresses.root_chord),
            tip_chord: Field::input(label, "tip_chord", addresses.tip_chord),
            empirical_coefficient: Field::input(
                label,
                "empirical_coefficient",
                addresses.empirical_coefficient,
            ),
            stored_area: Field::input(label, "stored_area", addresses.stored_area),
            aspect_ratio: Field::derived(label, "aspect_ratio", addresses.aspect_ratio),
            volume: Field::derived(label, "volume", addresses.volume),
        }
    }

    pub fn wing() -> Self {
        Self::new("wing", SurfaceAddresses::WING)
    }

    pub fn stabilizer() -> Self {
        Self::new("stabilizer", SurfaceAddresses::STABILIZER)
    }

    pub fn fin() -> Self {
        Self::new("fin", SurfaceAddresses::FIN)
    }

    /// Span over root chord. A zero root chord stores a non-finite value.
    pub fn update_aspect_ratio(&mut self) -> Result<(), ComputeError> {
        let aspect_ratio = self.calculate_aspect_ratio();
        self.aspect_ratio.store(aspect_ratio)
    }

    pub fn update_volume(&mut self) -> Result<(), ComputeError> {
        let volume = self.calculate_volume();
        self.volume.store(volume)
    }

    pub fn update(&mut self) -> Vec<ComputeError> {
        [self.update_aspect_ratio(), self.update_volume()]
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }

    fn calculate_aspect_ratio(&self) -> Result<f64, ComputeError> {
        Ok(self.span.require()? / self.root_chord.require()?)
    }

    fn calculate_volume(&self) -> Result<f64, ComputeError> {
        let mean_chord = 0.5 * (self.root_chord.require()? + self.tip_chord.require()?);
        Ok(self.empirical_coefficient.require()? * mean_chord.powi(2) * self.span.require()?)
    }
}

impl Component for Surface {
    fn label(&self) -> &'static str {
        self.label
    }

    fn fields(&self) -> Vec<&Field> {
        vec![
            &self.span,
            &self.root_chord,
            &self.tip_chord,
            &self.empirical_coefficient,
            &self.stored_area,
            &self.aspect_ratio,
            &self.volume,
        ]
    }

    fn fields_mut(&mut self) -> Vec<&mut Field> {
        vec![
            &mut self.span,
            &mut self.root_chord,
            &mut self.tip_chord,
            &mut self.empirical_coefficient,
            &mut self.stored_area,
            &mut self.aspect_ratio,
            &mut self.volume,
        ]
    }
}

use serde::Serialize;

use crate::model::environment::Environment;
use crate::model::field::{Component, Field, FieldKind, FieldValue};
use crate::record::CellRecord;
use crate::sync::SyncReport;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSnapshot {
    pub name: &'static str,
    pub address: Option<&'static str>,
    pub kind: FieldKind,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSnapshot {
    pub label: &'static str,
    pub fields: Vec<FieldSnapshot>,
}

/// Every field of every entity at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSnapshot {
    pub cruise_speed: FieldSnapshot,
    pub components: Vec<ComponentSnapshot>,
}

impl From<&Field> for FieldSnapshot {
    fn from(field: &Field) -> Self {
        FieldSnapshot {
            name: field.name(),
            address: field.address(),
            kind: field.kind(),
            value: field.value().clone(),
        }
    }
}

impl ComponentSnapshot {
    fn capture(component: &dyn Component) -> Self {
        ComponentSnapshot {
            label: component.label(),
            fields: component.fields().into_iter().map(FieldSnapshot::from).collect(),
        }
    }
}

impl ModelSnapshot {
    pub fn capture<R: CellRecord>(environment: &Environment<R>) -> Self {
        ModelSnapshot {
            cruise_speed: FieldSnapshot::from(environment.cruise_speed()),
            components: environment
                .components()
                .into_iter()
                .map(ComponentSnapshot::capture)
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Derived fields only, in recomputation order.
    pub fn derived(&self) -> impl Iterator<Item = (&'static str, &FieldSnapshot)> + '_ {
        self.components.iter().flat_map(|component| {
            component
                .fields
                .iter()
                .filter(|field| field.kind == FieldKind::Derived)
                .map(move |field| (component.label, field))
        })
    }

    fn format_value(value: &FieldValue) -> String {
        match value {
            FieldValue::Present(v) if v.is_finite() && v.abs() >= 1e4 => format!("{v:.1}"),
            FieldValue::Present(v) if v.is_finite() => format!("{v:.6}"),
            FieldValue::Present(v) => format!("{v}"),
            FieldValue::Absent => "-".to_string(),
            FieldValue::Invalid(reason) => format!("invalid ({reason})"),
        }
    }

    fn format_endurance(seconds: f64) -> String {
        if !seconds.is_finite() {
            return format!("{seconds}");
        }
        if seconds < 60.0 {
            return format!("{:.2}s", seconds);
        }
        let total = seconds.round() as u64;
        let (hours, minutes, secs) = (total / 3600, total % 3600 / 60, total % 60);
        if hours > 0 {
            format!("{hours}h {minutes}m {secs}s")
        } else {
            format!("{minutes}m {secs}s")
        }
    }

    pub fn display_data(&self) {
        println!("--- Model Data ---");
        println!(
            "{:<12} {:<22} {:<5} {:<8} {}",
            "component", "field", "cell", "kind", "value"
        );
        let rows = std::iter::once(("environment", &self.cruise_speed)).chain(
            self.components
                .iter()
                .flat_map(|c| c.fields.iter().map(move |f| (c.label, f))),
        );
        for (label, field) in rows {
            println!(
                "{:<12} {:<22} {:<5} {:<8} {}",
                label,
                field.name,
                field.address.unwrap_or("-"),
                format!("{:?}", field.kind),
                Self::format_value(&field.value)
            );
        }
        println!("--- End of Model Data ---");

        let endurance = self
            .derived()
            .find(|(label, field)| *label == "aerodynamics" && field.name == "endurance")
            .and_then(|(_, field)| field.value.as_f64());
        if let Some(seconds) = endurance {
            println!("\nEndurance at cruise: {}", Self::format_endurance(seconds));
        }
    }
}

pub fn display_report(title: &str, report: &SyncReport) {
    println!("\n--- {title}: {report} ---");
    for issue in report.issues() {
        println!("  {issue}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::record::MemoryRecord;

    #[test]
    fn test_capture_lists_every_field() {
        let env = Environment::new(MemoryRecord::new(), ModelConfig::default()).unwrap();
        let snapshot = ModelSnapshot::capture(&env);

        assert_eq!(snapshot.components.len(), 7);
        assert_eq!(snapshot.components[0].label, "wing");
        assert_eq!(snapshot.components[5].fields.len(), 14);
        assert_eq!(snapshot.cruise_speed.address, Some("I16"));
        assert_eq!(snapshot.derived().count(), 2 * 3 + 2 + 2 + 6 + 7);
    }

    #[test]
    fn test_to_json() {
        let mut env = Environment::new(MemoryRecord::new(), ModelConfig::default()).unwrap();
        env.wing.span.set(1.2);
        let json = ModelSnapshot::capture(&env).to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["components"][0]["fields"][0]["value"]["Present"], 1.2);
        assert_eq!(value["cruise_speed"]["value"], "Absent");
    }

    #[test]
    fn test_format_endurance() {
        assert_eq!(ModelSnapshot::format_endurance(999.0), "16m 39s");
        assert_eq!(ModelSnapshot::format_endurance(3725.0), "1h 2m 5s");
        assert_eq!(ModelSnapshot::format_endurance(12.5), "12.50s");
        assert_eq!(ModelSnapshot::format_endurance(119.6), "2m 0s");
        assert_eq!(ModelSnapshot::format_endurance(3599.7), "1h 0m 0s");
        assert_eq!(ModelSnapshot::format_endurance(f64::INFINITY), "inf");
    }
}

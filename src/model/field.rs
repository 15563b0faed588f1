use serde::Serialize;

use crate::errors::ComputeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// Authoritative: written by `load` or by the caller, never computed.
    Input,
    /// Written by exactly one computation; only checked against the record.
    Derived,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    Present(f64),
    Absent,
    Invalid(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Present(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FieldValue::Present(_))
    }

    /// Bitwise comparison, so that two NaN results compare equal.
    pub fn same_bits(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Present(a), FieldValue::Present(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

/// One model attribute together with its binding to the external record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    owner: &'static str,
    name: &'static str,
    address: Option<&'static str>,
    kind: FieldKind,
    value: FieldValue,
}

impl Field {
    pub fn input(owner: &'static str, name: &'static str, address: &'static str) -> Self {
        Self::bound(owner, name, Some(address), FieldKind::Input)
    }

    pub fn derived(owner: &'static str, name: &'static str, address: &'static str) -> Self {
        Self::bound(owner, name, Some(address), FieldKind::Derived)
    }

    /// An input that mirrors a value owned elsewhere. It has no cell of its
    /// own, so the sync protocol never reads or writes it.
    pub fn copy(owner: &'static str, name: &'static str) -> Self {
        Self::bound(owner, name, None, FieldKind::Input)
    }

    fn bound(
        owner: &'static str,
        name: &'static str,
        address: Option<&'static str>,
        kind: FieldKind,
    ) -> Self {
        Field {
            owner,
            name,
            address,
            kind,
            value: FieldValue::Absent,
        }
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn address(&self) -> Option<&'static str> {
        self.address
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn get(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// The current number, or the error a computation reading it should fail with.
    pub fn require(&self) -> Result<f64, ComputeError> {
        match &self.value {
            FieldValue::Present(value) => Ok(*value),
            FieldValue::Absent => Err(ComputeError::MissingInput {
                component: self.owner,
                field: self.name,
            }),
            FieldValue::Invalid(reason) => Err(ComputeError::InvalidInput {
                component: self.owner,
                field: self.name,
                reason: reason.clone(),
            }),
        }
    }

    pub fn set(&mut self, value: f64) {
        self.value = FieldValue::Present(value);
    }

    pub fn assign(&mut self, value: FieldValue) {
        self.value = value;
    }

    /// Stores the outcome of this field's computation. A failed computation
    /// leaves the field `Invalid` so that its readers fail in turn.
    pub(crate) fn store(&mut self, result: Result<f64, ComputeError>) -> Result<(), ComputeError> {
        match result {
            Ok(value) => {
                self.value = FieldValue::Present(value);
                Ok(())
            }
            Err(error) => {
                self.value = FieldValue::Invalid(error.to_string());
                Err(error)
            }
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }
}

/// An entity whose attributes are exposed as a fixed list of fields.
///
/// Both lists must name the same fields in the same order.
pub trait Component {
    fn label(&self) -> &'static str;

    fn fields(&self) -> Vec<&Field>;

    fn fields_mut(&mut self) -> Vec<&mut Field>;

    fn field(&self, name: &str) -> Option<&Field> {
        self.fields().into_iter().find(|field| field.name() == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields_mut()
            .into_iter()
            .find(|field| field.name() == name)
    }
}

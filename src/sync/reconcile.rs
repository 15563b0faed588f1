use log::debug;

use super::report::{SyncIssue, SyncReport};
use crate::model::field::{Component, Field, FieldKind, FieldValue};
use crate::record::CellRecord;

/// Reads one bound field's cell. `Ok(None)` is a blank cell; any failure is
/// already turned into an `AddressRead` issue.
fn read_number<R: CellRecord + ?Sized>(
    field: &Field,
    address: &'static str,
    record: &R,
) -> Result<Option<f64>, SyncIssue> {
    let read_error = |reason: String| SyncIssue::AddressRead {
        component: field.owner(),
        field: field.name(),
        address,
        reason,
    };

    let raw = match record.read_cell(address) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(None),
        Err(error) => return Err(read_error(error.to_string())),
    };
    raw.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| read_error(format!("unparsable value `{raw}`")))
}

/// Assigns one input field from its cell.
///
/// An unreadable or unparsable cell keeps the previous value; a field that
/// had no value yet becomes `Invalid` so that its readers name the cause.
pub fn load_field<R: CellRecord + ?Sized>(field: &mut Field, record: &R, report: &mut SyncReport) {
    let Some(address) = field.address() else {
        return;
    };
    if field.kind() != FieldKind::Input {
        return;
    }

    match read_number(field, address, record) {
        Ok(Some(value)) => field.set(value),
        Ok(None) => debug!("{} (cell {address}) is blank", field.qualified_name()),
        Err(issue) => {
            if !field.value().is_present() {
                field.assign(FieldValue::Invalid(issue.to_string()));
            }
            report.push(issue);
        }
    }
}

/// Writes one input field to its cell. Fields without a value are skipped.
pub fn push_field<R: CellRecord + ?Sized>(field: &Field, record: &mut R, report: &mut SyncReport) {
    let Some(address) = field.address() else {
        return;
    };
    if field.kind() != FieldKind::Input {
        return;
    }

    let Some(value) = field.get() else {
        debug!("{} has no value to push", field.qualified_name());
        return;
    };
    if let Err(error) = record.write_cell(address, value) {
        report.push(SyncIssue::AddressWrite {
            component: field.owner(),
            field: field.name(),
            address,
            reason: error.to_string(),
        });
    }
}

/// Compares one derived field with its cell. Never writes either side.
///
/// A non-finite computed value is always reported, whatever the cell holds.
/// A non-finite recorded value never matches.
pub fn check_field<R: CellRecord + ?Sized>(
    field: &Field,
    record: &R,
    tolerance: f64,
    report: &mut SyncReport,
) {
    let Some(address) = field.address() else {
        return;
    };
    if field.kind() != FieldKind::Derived {
        return;
    }

    let Some(computed) = field.get() else {
        return;
    };
    if !computed.is_finite() {
        report.push(SyncIssue::NonFiniteResult {
            component: field.owner(),
            field: field.name(),
            address,
            value: computed,
        });
        return;
    }

    match read_number(field, address, record) {
        Ok(Some(recorded)) if !recorded.is_finite() || (recorded - computed).abs() > tolerance => {
            report.push(SyncIssue::ToleranceViolation {
                component: field.owner(),
                field: field.name(),
                address,
                recorded,
                computed,
            });
        }
        Ok(_) => {}
        Err(issue) => report.push(issue),
    }
}

pub fn load_inputs<C, R>(component: &mut C, record: &R, report: &mut SyncReport)
where
    C: Component + ?Sized,
    R: CellRecord + ?Sized,
{
    for field in component.fields_mut() {
        load_field(field, record, report);
    }
}

pub fn push_inputs<C, R>(component: &C, record: &mut R, report: &mut SyncReport)
where
    C: Component + ?Sized,
    R: CellRecord + ?Sized,
{
    for field in component.fields() {
        push_field(field, record, report);
    }
}

pub fn check_derived<C, R>(component: &C, record: &R, tolerance: f64, report: &mut SyncReport)
where
    C: Component + ?Sized,
    R: CellRecord + ?Sized,
{
    for field in component.fields() {
        check_field(field, record, tolerance, report);
    }
}

//! Normalization of the `lista-dentro` roster: entry timestamps, dwell time
//! and vehicle category.

use crate::types::{Dwell, RawVehicleRecord, VehicleCategory, VehicleInLot};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use log::warn;

/// How to read a timestamp that carries no UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaiveZone {
    Local,
    Utc,
}

/// One place the server may have put the entry timestamp.
pub struct EntryTimestampSource {
    pub field: &'static str,
    pub naive_zone: NaiveZone,
    extract: fn(&RawVehicleRecord) -> Option<&str>,
}

/// Tried in order; the first field that parses wins.
pub const ENTRY_TIMESTAMP_SOURCES: [EntryTimestampSource; 3] = [
    EntryTimestampSource {
        field: "fechaEntrada",
        naive_zone: NaiveZone::Local,
        extract: primary_field,
    },
    EntryTimestampSource {
        field: "cfechaEntradaUtc",
        naive_zone: NaiveZone::Utc,
        extract: utc_field,
    },
    EntryTimestampSource {
        field: "fechaEntradaUtcIso",
        naive_zone: NaiveZone::Utc,
        extract: iso_field,
    },
];

fn primary_field(record: &RawVehicleRecord) -> Option<&str> {
    record.fecha_entrada.as_deref()
}

fn utc_field(record: &RawVehicleRecord) -> Option<&str> {
    record.cfecha_entrada_utc.as_deref()
}

fn iso_field(record: &RawVehicleRecord) -> Option<&str> {
    record.fecha_entrada_utc_iso.as_deref()
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a server timestamp and converts it to local time.
///
/// Values with an explicit offset are converted; values without one are read
/// in `naive_zone`. Feeding the output back in yields the same instant.
pub fn parse_timestamp(raw: &str, naive_zone: NaiveZone) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Local));
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())?;
    match naive_zone {
        NaiveZone::Utc => Some(Utc.from_utc_datetime(&naive).with_timezone(&Local)),
        // Ambiguous wall-clock times (DST fold) take the earlier instant.
        NaiveZone::Local => Local.from_local_datetime(&naive).earliest(),
    }
}

pub fn resolve_entry_timestamp(record: &RawVehicleRecord) -> Option<DateTime<Local>> {
    ENTRY_TIMESTAMP_SOURCES.iter().find_map(|source| {
        let raw = (source.extract)(record)?;
        let parsed = parse_timestamp(raw, source.naive_zone);
        if parsed.is_none() && !raw.trim().is_empty() {
            warn!(
                "Unparsable {} {:?} for plate {}",
                source.field,
                raw,
                record.placa
            );
        }
        parsed
    })
}

/// Elapsed time since `entered_at`, clamped at zero for entries stamped in
/// the future by a skewed clock.
pub fn dwell_since(entered_at: DateTime<Local>, now: DateTime<Local>) -> Dwell {
    Dwell::from_total_minutes((now - entered_at).num_minutes())
}

pub fn infer_category(plate: &str) -> VehicleCategory {
    match plate.chars().last() {
        Some(c) if c.is_alphabetic() => VehicleCategory::Motorcycle,
        Some(c) if c.is_ascii_digit() => VehicleCategory::Car,
        _ => VehicleCategory::Unknown,
    }
}

/// The dwell the server reported alongside the record, if any.
fn server_dwell(record: &RawVehicleRecord) -> Option<Dwell> {
    match (record.horas, record.minutos) {
        (None, None) => None,
        (hours, minutes) => Some(Dwell::from_total_minutes(
            hours.unwrap_or(0) * 60 + minutes.unwrap_or(0),
        )),
    }
}

pub fn normalize(record: RawVehicleRecord, now: DateTime<Local>) -> VehicleInLot {
    let entered_at = resolve_entry_timestamp(&record);
    let dwell = entered_at
        .map(|t| dwell_since(t, now))
        .or_else(|| server_dwell(&record));
    let category = match record.tipo.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => VehicleCategory::from_label(label),
        _ => infer_category(&record.placa),
    };
    VehicleInLot {
        movement_id: record.id,
        dwell,
        entered_at,
        category,
        plate: record.placa,
    }
}

pub fn normalize_all(records: Vec<RawVehicleRecord>, now: DateTime<Local>) -> Vec<VehicleInLot> {
    records.into_iter().map(|r| normalize(r, now)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RosterSummary {
    pub total: usize,
    pub cars: usize,
    pub motorcycles: usize,
}

impl RosterSummary {
    pub fn of(vehicles: &[VehicleInLot]) -> RosterSummary {
        let count = |category: VehicleCategory| {
            vehicles.iter().filter(|v| v.category == category).count()
        };
        RosterSummary {
            total: vehicles.len(),
            cars: count(VehicleCategory::Car),
            motorcycles: count(VehicleCategory::Motorcycle),
        }
    }

    pub fn render(&self) -> String {
        if self.total == 0 {
            "No hay vehículos dentro".to_string()
        } else {
            format!(
                "Total: {} — Carro: {} Moto: {}",
                self.total, self.cars, self.motorcycles
            )
        }
    }
}

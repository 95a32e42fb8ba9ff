use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The API sends `null` for empty strings and numbers; treat those as absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// No Debug impl: the password must never reach a log line.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthResult {
    pub success: bool,
    pub message: String,
}

/// One row of `lista-dentro` as the server sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVehicleRecord {
    #[serde(alias = "Id")]
    pub id: Option<i64>,
    #[serde(alias = "Placa")]
    #[serde(deserialize_with = "null_as_default")]
    pub placa: String,
    #[serde(rename = "fechaEntrada", alias = "FechaEntrada")]
    pub fecha_entrada: Option<String>,
    #[serde(rename = "cfechaEntradaUtc", alias = "CfechaEntradaUtc")]
    pub cfecha_entrada_utc: Option<String>,
    #[serde(rename = "fechaEntradaUtcIso", alias = "FechaEntradaUtcIso")]
    pub fecha_entrada_utc_iso: Option<String>,
    /// Dwell as computed by the server, kept when no timestamp resolves.
    #[serde(alias = "Horas")]
    pub horas: Option<i64>,
    #[serde(alias = "Minutos")]
    pub minutos: Option<i64>,
    #[serde(alias = "Tipo")]
    pub tipo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VehicleCategory {
    Car,
    Motorcycle,
    Unknown,
    /// A label the server sent that is neither car nor motorcycle.
    Other(String),
}

impl VehicleCategory {
    pub fn from_label(label: &str) -> VehicleCategory {
        match label.trim().to_lowercase().as_str() {
            "carro" | "car" => VehicleCategory::Car,
            "moto" | "motorcycle" => VehicleCategory::Motorcycle,
            "desconocido" | "" => VehicleCategory::Unknown,
            _ => VehicleCategory::Other(label.trim().to_string()),
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleCategory::Car => f.pad("Carro"),
            VehicleCategory::Motorcycle => f.pad("Moto"),
            VehicleCategory::Unknown => f.pad("Desconocido"),
            VehicleCategory::Other(label) => f.pad(label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dwell {
    pub hours: i64,
    pub minutes: i64,
}

impl Dwell {
    pub fn from_total_minutes(total: i64) -> Dwell {
        let total = total.max(0);
        Dwell {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn total_minutes(&self) -> i64 {
        self.hours * 60 + self.minutes
    }
}

impl fmt::Display for Dwell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {:02}m", self.hours, self.minutes)
    }
}

/// A vehicle currently inside the lot, after timestamp normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleInLot {
    pub movement_id: Option<i64>,
    pub plate: String,
    pub entered_at: Option<DateTime<Local>>,
    pub category: VehicleCategory,
    pub dwell: Option<Dwell>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TariffOption {
    #[serde(rename = "parkTarId", alias = "ParkTarId")]
    #[serde(deserialize_with = "null_as_default")]
    pub id: i32,
    #[serde(rename = "parkTarNomb", alias = "ParkTarNomb")]
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusResult {
    #[serde(rename = "existe", alias = "Existe")]
    #[serde(deserialize_with = "null_as_default")]
    pub exists: bool,
    #[serde(alias = "Status")]
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(rename = "fechaEntrada", alias = "FechaEntrada")]
    pub entered_at: Option<String>,
    #[serde(rename = "fechaSalida", alias = "FechaSalida")]
    pub exited_at: Option<String>,
    #[serde(rename = "dias", alias = "Dias")]
    #[serde(deserialize_with = "null_as_default")]
    pub days: i64,
    #[serde(rename = "horas", alias = "Horas")]
    #[serde(deserialize_with = "null_as_default")]
    pub hours: i64,
    #[serde(rename = "minutos", alias = "Minutos")]
    #[serde(deserialize_with = "null_as_default")]
    pub minutes: i64,
    #[serde(rename = "tipo", alias = "Tipo")]
    #[serde(deserialize_with = "null_as_default")]
    pub vehicle_type: String,
    #[serde(rename = "formato", alias = "Formato")]
    #[serde(deserialize_with = "null_as_default")]
    pub plate_format: String,
    #[serde(rename = "valido", alias = "Valido")]
    #[serde(deserialize_with = "null_as_default")]
    pub valid: bool,
    #[serde(alias = "Error")]
    pub error: Option<String>,
    #[serde(rename = "tarifas", alias = "Tarifas")]
    pub tariffs: Vec<TariffOption>,
}

impl StatusResult {
    pub fn is_inside(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("dentro")
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

#[derive(Serialize)]
pub struct EntryRequest<'a> {
    pub placa: &'a str,
    #[serde(rename = "tarifaId")]
    pub tarifa_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TicketResult {
    /// Absent on servers that only answer with the ticket itself.
    #[serde(alias = "Success")]
    pub success: Option<bool>,
    #[serde(alias = "Ticket")]
    #[serde(deserialize_with = "null_as_default")]
    pub ticket: i64,
    #[serde(rename = "placa", alias = "Placa")]
    #[serde(deserialize_with = "null_as_default")]
    pub plate: String,
    #[serde(rename = "tipoVehiculo", alias = "TipoVehiculo")]
    #[serde(deserialize_with = "null_as_default")]
    pub vehicle_type: String,
    #[serde(rename = "fechaEntrada", alias = "FechaEntrada")]
    #[serde(deserialize_with = "null_as_default")]
    pub entered_at: String,
}

#[derive(Debug, Serialize)]
pub struct ExitRequest<'a> {
    pub placa: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub pago: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub monto: Decimal,
}

/// Projection of a roster row used to find a plate's movement id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovementRef {
    #[serde(alias = "Id")]
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(alias = "Placa")]
    #[serde(deserialize_with = "null_as_default")]
    pub placa: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmountResult {
    #[serde(alias = "Monto")]
    #[serde(with = "rust_decimal::serde::float")]
    pub monto: Decimal,
}

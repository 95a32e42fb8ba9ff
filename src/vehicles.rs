//! Client for the `/api/Movimientos` endpoints.

use crate::error::ApiError;
use crate::http::{decode_json, ensure_success, ApiClient};
use crate::roster;
use crate::types::{
    AmountResult, EntryRequest, ExitRequest, MovementRef, RawVehicleRecord, StatusResult,
    TicketResult, VehicleInLot,
};
use chrono::{DateTime, Local};
use log::{error, info, warn};
use rust_decimal::Decimal;

const INSIDE_ENDPOINT: &str = "/api/Movimientos/lista-dentro";
const STATUS_ENDPOINT: &str = "/api/Movimientos/status";
const ENTRY_ENDPOINT: &str = "/api/Movimientos/nuevo";
const EXIT_ENDPOINT: &str = "/api/Movimientos/salida";
const AMOUNT_ENDPOINT: &str = "/api/Movimientos/calcular";

#[derive(Debug, Clone)]
pub struct VehicleService {
    api: ApiClient,
}

impl VehicleService {
    pub fn new(api: ApiClient) -> VehicleService {
        VehicleService { api }
    }

    async fn raw_roster(&self) -> Result<Vec<RawVehicleRecord>, ApiError> {
        let url = self.api.url(INSIDE_ENDPOINT, &[])?;
        // The server answers `null` instead of `[]` when the lot is empty.
        let records: Option<Vec<RawVehicleRecord>> = self.api.get_json(url).await?;
        Ok(records.unwrap_or_default())
    }

    /// Vehicles currently inside, with local entry times and dwell computed
    /// against the current clock.
    pub async fn list_inside(&self) -> Result<Vec<VehicleInLot>, ApiError> {
        let records = self.raw_roster().await.map_err(|e| {
            error!("Error fetching vehicles inside: {:?}", e);
            e
        })?;
        info!("Fetched {} vehicles inside", records.len());
        Ok(roster::normalize_all(records, Local::now()))
    }

    pub async fn status(&self, plate: &str) -> Result<StatusResult, ApiError> {
        info!("Querying status for plate {}", plate);
        let url = self.api.url(STATUS_ENDPOINT, &[plate])?;
        let status: Option<StatusResult> = self.api.get_json(url).await.map_err(|e| {
            warn!("Status query for {} failed: {:?}", plate, e);
            e
        })?;
        Ok(status.unwrap_or_default())
    }

    pub async fn register_entry(
        &self,
        plate: &str,
        tariff_id: i32,
    ) -> Result<TicketResult, ApiError> {
        info!("Registering entry of {} with tariff {}", plate, tariff_id);
        let url = self.api.url(ENTRY_ENDPOINT, &[])?;
        let body = EntryRequest {
            placa: plate,
            tarifa_id: tariff_id,
        };
        let response = ensure_success(self.api.post_json(url, &body).await?).await?;
        let ticket: Option<TicketResult> = decode_json(response).await?;
        let ticket = ticket.unwrap_or_default();
        if ticket.success == Some(false) {
            warn!("Server refused entry for {}", plate);
            return Err(ApiError::Rejected(format!(
                "No se pudo registrar la entrada de {}",
                plate
            )));
        }
        info!("Entry registered for {}: ticket {}", plate, ticket.ticket);
        Ok(ticket)
    }

    pub async fn register_exit(
        &self,
        plate: &str,
        paid: Decimal,
        due: Decimal,
    ) -> Result<(), ApiError> {
        info!("Registering exit of {}: paid {}, due {}", plate, paid, due);
        let url = self.api.url(EXIT_ENDPOINT, &[])?;
        let body = ExitRequest {
            placa: plate,
            pago: paid,
            monto: due,
        };
        ensure_success(self.api.post_json(url, &body).await?).await?;
        info!("Exit registered for {}", plate);
        Ok(())
    }

    /// Server-side price for a vehicle inside: the plate's movement id comes
    /// from the roster, the amount from `calcular/{id}`.
    pub async fn compute_amount(&self, plate: &str) -> Result<Decimal, ApiError> {
        info!("Computing amount for {}", plate);
        let url = self.api.url(INSIDE_ENDPOINT, &[])?;
        let movements: Option<Vec<MovementRef>> = self.api.get_json(url).await?;
        let movement = movements
            .unwrap_or_default()
            .into_iter()
            .find(|m| same_plate(&m.placa, plate))
            .ok_or_else(|| ApiError::NotInside(plate.to_string()))?;

        let id = movement.id.to_string();
        let url = self.api.url(AMOUNT_ENDPOINT, &[&id])?;
        let amount: AmountResult = self.api.get_json(url).await?;
        info!("Amount for {} (movement {}): {}", plate, id, amount.monto);
        Ok(amount.monto)
    }

    /// Entry time of one vehicle, looked up in the full roster.
    ///
    /// This walks the whole list for one plate; fine at a single lot's
    /// volume, but it is a full fetch per call.
    pub async fn entry_timestamp(&self, plate: &str) -> Result<Option<DateTime<Local>>, ApiError> {
        info!("Looking up entry time for {}", plate);
        let records = self.raw_roster().await?;
        Ok(records
            .iter()
            .find(|r| same_plate(&r.placa, plate))
            .and_then(roster::resolve_entry_timestamp))
    }
}

fn same_plate(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

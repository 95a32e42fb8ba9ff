//! The attendant's entry/exit flow.
//!
//! One operation at a time: `Idle` → `EntryPending` or `ExitPending` →
//! `Idle`. Every remote error reaches the caller as a `WorkflowError`; no
//! call is retried.

use crate::auth::AuthService;
use crate::config::{Config, FeeSchedule};
use crate::error::{ApiError, WorkflowError};
use crate::fees;
use crate::http::ApiClient;
use crate::roster::{self, NaiveZone, RosterSummary};
use crate::types::{AuthResult, StatusResult, TariffOption, TicketResult, VehicleInLot};
use crate::vehicles::VehicleService;
use chrono::{DateTime, Local};
use log::{info, warn};
use rust_decimal::Decimal;

/// Where the amount due for an exit came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ChargeSource {
    Server,
    Fallback {
        entered_at: DateTime<Local>,
        hours_billed: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Idle,
    EntryPending {
        plate: String,
        tariffs: Vec<TariffOption>,
    },
    ExitPending {
        plate: String,
        due: Decimal,
        source: ChargeSource,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub plate: String,
    pub paid: Decimal,
    pub due: Decimal,
    pub change: Decimal,
}

pub struct Attendant {
    auth: AuthService,
    vehicles: VehicleService,
    fees: FeeSchedule,
    stage: Stage,
}

impl Attendant {
    pub fn new(config: &Config) -> Result<Attendant, ApiError> {
        let api = ApiClient::new(config)?;
        Ok(Attendant {
            auth: AuthService::new(api.clone()),
            vehicles: VehicleService::new(api),
            fees: config.fees,
            stage: Stage::Idle,
        })
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, WorkflowError> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(WorkflowError::EmptyCredentials);
        }
        Ok(self.auth.login(email.trim(), password).await)
    }

    pub async fn roster(&self) -> Result<(Vec<VehicleInLot>, RosterSummary), WorkflowError> {
        let vehicles = self.vehicles.list_inside().await?;
        let summary = RosterSummary::of(&vehicles);
        Ok((vehicles, summary))
    }

    /// Looks the plate up and moves to the entry or exit step.
    pub async fn submit_plate(&mut self, input: &str) -> Result<&Stage, WorkflowError> {
        if self.stage != Stage::Idle {
            return Err(WorkflowError::InvalidState(
                "hay una operación en curso, cancélela primero",
            ));
        }
        let plate = input.trim().to_uppercase();
        if plate.is_empty() {
            return Err(WorkflowError::EmptyPlate);
        }
        info!("Plate submitted: {}", plate);

        let status = self.vehicles.status(&plate).await?;
        if let Some(reason) = status.error_message() {
            warn!("Status for {} reported: {}", plate, reason);
            return Err(ApiError::Rejected(reason.to_string()).into());
        }

        self.stage = if status.is_inside() {
            let (due, source) = self.price_exit(&plate, &status).await?;
            info!("{} is inside, due {} ({:?})", plate, due, source);
            Stage::ExitPending { plate, due, source }
        } else {
            info!("{} is outside, {} tariffs offered", plate, status.tariffs.len());
            Stage::EntryPending {
                plate,
                tariffs: status.tariffs,
            }
        };
        Ok(&self.stage)
    }

    async fn price_exit(
        &self,
        plate: &str,
        status: &StatusResult,
    ) -> Result<(Decimal, ChargeSource), WorkflowError> {
        match self.vehicles.compute_amount(plate).await {
            Ok(amount) => return Ok((amount, ChargeSource::Server)),
            Err(e) => warn!("Server amount for {} unavailable, using fallback: {:?}", plate, e),
        }

        let from_status = status
            .entered_at
            .as_deref()
            .and_then(|raw| roster::parse_timestamp(raw, NaiveZone::Local));
        let entered_at = match from_status {
            Some(t) => t,
            None => self
                .vehicles
                .entry_timestamp(plate)
                .await
                .unwrap_or_else(|e| {
                    warn!("Roster lookup for {} failed: {:?}", plate, e);
                    None
                })
                .ok_or_else(|| WorkflowError::UnknownEntryTime(plate.to_string()))?,
        };

        let now = Local::now();
        let hours_billed = fees::hours_billed(entered_at, now);
        let due = fees::fee_for_hours(&self.fees, hours_billed);
        Ok((
            due,
            ChargeSource::Fallback {
                entered_at,
                hours_billed,
            },
        ))
    }

    /// Registers the entry with the chosen tariff. On failure the workflow
    /// stays in `EntryPending` so the attendant can retry or cancel.
    pub async fn choose_tariff(&mut self, tariff_id: i32) -> Result<TicketResult, WorkflowError> {
        let plate = match &self.stage {
            Stage::EntryPending { plate, tariffs } => {
                // An empty list means the server did not offer choices; it
                // validates the id itself.
                if !tariffs.is_empty() && !tariffs.iter().any(|t| t.id == tariff_id) {
                    return Err(WorkflowError::MissingTariff);
                }
                plate.clone()
            }
            _ => return Err(WorkflowError::InvalidState("no hay una entrada pendiente")),
        };
        let ticket = self.vehicles.register_entry(&plate, tariff_id).await?;
        self.stage = Stage::Idle;
        Ok(ticket)
    }

    /// Validates the payment, registers the exit and returns the change.
    pub async fn confirm_payment(&mut self, paid: Decimal) -> Result<Receipt, WorkflowError> {
        let (plate, due) = match &self.stage {
            Stage::ExitPending { plate, due, .. } => (plate.clone(), *due),
            _ => return Err(WorkflowError::InvalidState("no hay una salida pendiente")),
        };
        let change = fees::settle(paid, due)?;
        self.vehicles.register_exit(&plate, paid, due).await?;
        self.stage = Stage::Idle;
        Ok(Receipt {
            plate,
            paid,
            due,
            change,
        })
    }

    pub fn cancel(&mut self) {
        if self.stage != Stage::Idle {
            info!("Cancelled {:?}", self.stage);
        }
        self.stage = Stage::Idle;
    }
}

//! Local pricing used only when the server cannot compute an exit amount.
//! The server remains the authority; this mirrors its flat-rate tariff.

use crate::config::FeeSchedule;
use crate::error::WorkflowError;
use chrono::{DateTime, Duration, Local};
use rust_decimal::Decimal;

/// Hours to bill: elapsed time rounded up to the next full hour, never less
/// than one.
pub fn hours_billed(entered_at: DateTime<Local>, now: DateTime<Local>) -> i64 {
    let elapsed = (now - entered_at).max(Duration::zero());
    let whole = elapsed.num_hours();
    let billed = if elapsed > Duration::hours(whole) {
        whole + 1
    } else {
        whole
    };
    billed.max(1)
}

pub fn fee_for_hours(schedule: &FeeSchedule, hours: i64) -> Decimal {
    let extra = Decimal::from(hours.max(1) - 1);
    schedule.first_hour + extra * schedule.additional_hour
}

pub fn fallback_fee(
    schedule: &FeeSchedule,
    entered_at: DateTime<Local>,
    now: DateTime<Local>,
) -> Decimal {
    fee_for_hours(schedule, hours_billed(entered_at, now))
}

/// Returns the change owed, or rejects a payment below the amount due.
pub fn settle(paid: Decimal, due: Decimal) -> Result<Decimal, WorkflowError> {
    if paid < due {
        return Err(WorkflowError::InsufficientPayment { paid, due });
    }
    Ok(paid - due)
}

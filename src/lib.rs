//! Attendant client for the SigePark parking-lot API: login, the roster of
//! vehicles inside, and the entry/exit workflow.

#[macro_use]
extern crate failure;

pub mod auth;
pub mod config;
pub mod error;
pub mod fees;
pub mod http;
pub mod roster;
pub mod types;
pub mod vehicles;
pub mod workflow;

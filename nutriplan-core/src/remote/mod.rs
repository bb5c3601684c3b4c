//! Remote plan store client.
//!
//! ## Endpoints
//!
//! - `GET /plans?user_id=ID` returns `null` or a [`PlanRecord`]
//! - `POST /plans` takes a [`SavePlanRequest`]
//! - `GET /health` answers `200` when the store is up

mod client;
mod error;
mod protocol;

pub use client::{check_server, HttpPlanClient, RemotePlanStore, REQUEST_TIMEOUT};
pub use error::RemoteError;
pub use protocol::{PlanRecord, SavePlanRequest, SavePlanResponse};

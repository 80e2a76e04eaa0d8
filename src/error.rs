//! Error taxonomy for the routing pipeline.
//!
//! Kinds follow spec §7: region/graph/input errors are fatal, edge-tag and
//! no-path errors are recovered locally by the component that hits them and
//! never reach here as a propagated `Err`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("spreadsheet malformed: {0}")]
    InputMalformed(String),

    #[error("region lookup failed: {0}")]
    RegionLookupFailed(String),

    #[error("road graph unavailable: {0}")]
    GraphUnavailable(String),

    #[error("no tour satisfies the capacity constraint for vehicle {vehicle}: {detail}")]
    OptimizerInfeasible { vehicle: usize, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RoutingResult<T> = Result<T, RoutingError>;

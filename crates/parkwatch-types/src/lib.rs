use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error message returned when a report lacks `movimiento` or `espacios`.
pub const INCOMPLETE_DATA: &str = "Datos incompletos";

/// Error message returned when a report carries a value outside the allowed range.
pub const INVALID_DATA: &str = "Datos inválidos";

/// Latest occupancy reported by the sensor device.
///
/// Serialized with the field names the dashboard and the device firmware
/// expect (`ultimoMovimiento`, `espaciosDisponibles`).  The default value is
/// the state of a freshly started server: no movement yet, zero spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupancyState {
    /// Free-text label of the most recent movement, e.g. `"entrada"`.
    #[serde(rename = "ultimoMovimiento")]
    pub last_movement: Option<String>,
    /// Number of free spaces in the lot.
    #[serde(rename = "espaciosDisponibles")]
    pub available_spaces: u32,
}

impl OccupancyState {
    pub fn new(movement: impl Into<String>, spaces: u32) -> Self {
        Self {
            last_movement: Some(movement.into()),
            available_spaces: spaces,
        }
    }

    /// Movement label for display, with `placeholder` standing in before the
    /// first report.
    pub fn movement_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.last_movement.as_deref().unwrap_or(placeholder)
    }
}

/// Body of `POST /api/movimiento` as sent by the sensor device.
///
/// Both fields are optional at the wire level so that a missing field can be
/// told apart from a zero value; [`MovementReport::validate`] decides whether
/// the report is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementReport {
    #[serde(rename = "movimiento", default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<String>,
    #[serde(rename = "espacios", default, skip_serializing_if = "Option::is_none")]
    pub spaces: Option<i64>,
}

impl MovementReport {
    pub fn new(movement: impl Into<String>, spaces: u32) -> Self {
        Self {
            movement: Some(movement.into()),
            spaces: Some(i64::from(spaces)),
        }
    }

    /// Turn the report into the snapshot it describes.
    ///
    /// # Errors
    ///
    /// * [`ParkError::InvalidInput`] with [`INCOMPLETE_DATA`] when the movement
    ///   is missing or blank, or the space count is missing.
    /// * [`ParkError::InvalidInput`] with [`INVALID_DATA`] when the space count
    ///   is negative or does not fit a `u32`.
    pub fn validate(self) -> Result<OccupancyState, ParkError> {
        let movement = match self.movement {
            Some(m) if !m.trim().is_empty() => m,
            _ => return Err(ParkError::InvalidInput(INCOMPLETE_DATA.to_string())),
        };
        let Some(spaces) = self.spaces else {
            return Err(ParkError::InvalidInput(INCOMPLETE_DATA.to_string()));
        };
        let spaces = u32::try_from(spaces)
            .map_err(|_| ParkError::InvalidInput(INVALID_DATA.to_string()))?;
        Ok(OccupancyState::new(movement, spaces))
    }
}

/// Acknowledgment returned for an accepted report: `{ "status": "OK" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestAck {
    pub status: String,
}

impl IngestAck {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
        }
    }
}

/// Error body shared by every failing API call: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of `GET /healthz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    /// Number of reports accepted since the server started.
    pub revision: u64,
}

/// Error type shared by the server, the dashboard clients and the sensor side.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParkError {
    /// A report was rejected; the payload is the message sent back to the caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bind error on {addr}: {details}")]
    Bind { addr: String, details: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

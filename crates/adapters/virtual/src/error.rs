//! Errors raised by the virtual lights.

use zonelight_domain::error::ZonelightError;

#[derive(Debug, thiserror::Error)]
pub enum LightError {
    #[error("light '{id}' does not exist")]
    UnknownLight { id: String },

    #[error("light '{id}' is unavailable")]
    Unavailable { id: String },
}

impl From<LightError> for ZonelightError {
    fn from(err: LightError) -> Self {
        Self::Light(Box::new(err))
    }
}

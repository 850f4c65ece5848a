use thiserror::Error;

use autsai_db::GatewayError;

/// Why a screen mutation did not apply. Gateway failures leave local state
/// untouched; the rest are rejected before any write is issued.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("unknown setting '{0}'")]
    UnknownSetting(String),
    #[error("nothing to edit: {0}")]
    NotEditing(&'static str),
    #[error("invalid input: {0}")]
    Invalid(String),
}

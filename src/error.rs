use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum BeaconError {
    // Protocol sequencing errors
    InvalidMode,
    NotInitialized,

    // Parameter errors
    InvalidParameter,
    InvalidKey,
}

impl fmt::Display for BeaconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeaconError::InvalidMode => write!(f, "Operation not valid in current mode"),
            BeaconError::NotInitialized => write!(f, "Component not initialized"),
            BeaconError::InvalidParameter => write!(f, "Invalid parameter"),
            BeaconError::InvalidKey => write!(f, "Invalid key material"),
        }
    }
}

impl Error for BeaconError {}

pub type Result<T> = std::result::Result<T, BeaconError>;

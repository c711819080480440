use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Stream error: {0}")]
    Stream(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Unexpected status {status} from {path}")]
    UnexpectedStatus { path: String, status: u16 },

    #[error("Malformed payload: {0}")]
    Payload(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Overlay geometry error: {0}")]
    Geometry(#[from] geojson::Error),

    #[error("Connection closed")]
    Closed,

    #[error("Request pool closed")]
    PoolClosed,
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type MonitorResult<T> = Result<T, MonitorError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;

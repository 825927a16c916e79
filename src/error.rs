use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid tracker config: {0}")]
    InvalidConfig(String),

    #[error("Frame {current} is not after previously processed frame {previous}")]
    FrameOrder { previous: u64, current: u64 },

    #[error("Invalid detections dump: {0}")]
    InvalidDump(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}

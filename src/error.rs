//! Error types for VRCar

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// VRCar error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Unknown control command tag on the wire
    ///
    /// Fatal for the control session: motor safety depends on never
    /// misinterpreting command bytes.
    #[error("Unknown command tag: {0:#04x}")]
    UnknownCommand(u8),

    /// Declared frame length exceeds the sanity cap
    #[error("Frame too large: {0} bytes")]
    FrameTooLarge(usize),

    /// No render/input provider could be acquired
    #[error("No available providers")]
    NoProviders,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

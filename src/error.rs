//! Error types for forestfall.
//!
//! The simulation itself cannot fail. These cover the edges: loading a
//! scene configuration, exporting frames, and the runner binary.

use std::fmt;

/// Errors that can occur while loading or validating a scene configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    Io(std::io::Error),
    /// The file is not valid scene JSON.
    Json(serde_json::Error),
    /// The values parse but describe an impossible scene.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors that can occur while writing a rendered frame.
#[derive(Debug)]
pub enum ExportError {
    /// Failed to encode the image.
    Image(image::ImageError),
    /// Failed to create the output location.
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Image(e) => write!(f, "Failed to encode frame: {}", e),
            ExportError::Io(e) => write!(f, "Failed to write frame: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Image(e) => Some(e),
            ExportError::Io(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Image(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

/// Errors that can occur when running the headless renderer.
#[derive(Debug)]
pub enum RunnerError {
    /// Config could not be loaded.
    Config(ConfigError),
    /// A frame could not be exported.
    Export(ExportError),
    /// Bad command line.
    Usage(String),
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerError::Config(e) => write!(f, "Config error: {}", e),
            RunnerError::Export(e) => write!(f, "Export error: {}", e),
            RunnerError::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunnerError::Config(e) => Some(e),
            RunnerError::Export(e) => Some(e),
            RunnerError::Usage(_) => None,
        }
    }
}

impl From<ConfigError> for RunnerError {
    fn from(e: ConfigError) -> Self {
        RunnerError::Config(e)
    }
}

impl From<ExportError> for RunnerError {
    fn from(e: ExportError) -> Self {
        RunnerError::Export(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_message() {
        let e = ConfigError::Invalid("ground_y outside canvas".into());
        assert_eq!(e.to_string(), "Invalid config: ground_y outside canvas");
        assert!(e.source().is_none());
    }

    #[test]
    fn test_runner_wraps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e = RunnerError::from(ConfigError::from(io));
        assert!(e.to_string().contains("missing"));
        assert!(e.source().is_some());
    }
}

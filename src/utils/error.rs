use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Catalog fetch from {endpoint} failed: {message}")]
    FetchError { endpoint: String, message: String },

    #[error("Geocoding failed: {message}")]
    GeocodingError { message: String },

    #[error("Map viewport is not initialized")]
    MapNotInitialized,

    #[error("Base layer '{layer}' could not be attached: {message}")]
    LayerAttachError { layer: String, message: String },

    #[error("Marker '{key}' could not be created: {message}")]
    MarkerError { key: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Map,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AtlasError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AtlasError::HttpError(_)
            | AtlasError::FetchError { .. }
            | AtlasError::GeocodingError { .. } => ErrorCategory::Network,
            AtlasError::ConfigError { .. }
            | AtlasError::MissingConfigError { .. }
            | AtlasError::InvalidConfigValueError { .. }
            | AtlasError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            AtlasError::SerializationError(_) => ErrorCategory::Data,
            AtlasError::MapNotInitialized
            | AtlasError::LayerAttachError { .. }
            | AtlasError::MarkerError { .. } => ErrorCategory::Map,
            AtlasError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // A failed search or fetch leaves the view usable with an empty state.
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Map => ErrorSeverity::Low,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AtlasError::HttpError(_) | AtlasError::FetchError { .. } => {
                "Unable to load projects right now.".to_string()
            }
            AtlasError::GeocodingError { .. } => "Search failed. Please try again.".to_string(),
            AtlasError::MapNotInitialized => "The map is still loading.".to_string(),
            AtlasError::LayerAttachError { layer, .. } => {
                format!("Map style '{}' is unavailable.", layer)
            }
            AtlasError::MarkerError { key, .. } => {
                format!("Project '{}' could not be shown on the map.", key)
            }
            AtlasError::SerializationError(_) => "Received malformed data.".to_string(),
            AtlasError::ConfigError { .. }
            | AtlasError::MissingConfigError { .. }
            | AtlasError::InvalidConfigValueError { .. }
            | AtlasError::ConfigValidationError { .. } => format!("Invalid configuration: {}", self),
            AtlasError::IoError(e) => format!("File system error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the backend and network are reachable, then retry",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Data => "The backend returned unexpected data; check its logs",
            ErrorCategory::Map => "Reload the map view",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;

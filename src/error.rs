//! Error types for the form engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown form type: {form_type}")]
    UnknownFormType { form_type: String },

    #[error("Configuration not found for form type '{form_type}'")]
    ConfigNotFound { form_type: String },

    #[error("[{processor}] Form with ID \"{form_id}\" not found")]
    FormNotFound { processor: String, form_id: String },

    #[error("Payload error in {path}: {message}")]
    Payload { path: String, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, FormError>;

impl FormError {
    pub fn form_not_found(processor: impl Into<String>, form_id: impl Into<String>) -> Self {
        Self::FormNotFound {
            processor: processor.into(),
            form_id: form_id.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn payload(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Payload {
            path: path.into(),
            message: message.into(),
        }
    }
}

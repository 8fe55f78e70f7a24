use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope returned by every timesheet endpoint, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub errors: Vec<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            errors: Vec::new(),
            data: Some(data),
        }
    }

    /// Appends an advisory note to the message without failing the response.
    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        if let Some(warning) = warning {
            self.message = Some(match self.message.take() {
                Some(message) => format!("{} ({})", message, warning),
                None => warning,
            });
        }
        self
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            errors,
            data: None,
        }
    }
}

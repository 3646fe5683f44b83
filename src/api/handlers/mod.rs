pub mod analytics;
pub mod dashboard;
pub mod market;
pub mod system;
pub mod trades;

use serde::Serialize;

/// Envelope for list and mutation responses.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

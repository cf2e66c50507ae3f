// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;
pub mod convert;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod upload;
pub mod upload_analyze;

pub use analyze::{analyze_handler, AnalyzeResponse};
pub use convert::{convert_handler, ConvertResponse};
pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use handlers::{HealthResponse, RootResponse};
pub use http_server::{create_app, start_server, AppState};
pub use upload::{read_file_field, UploadedFile};
pub use upload_analyze::{upload_and_analyze_handler, UploadAnalyzeResponse};

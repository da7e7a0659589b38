use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use crate::config::ConfigError;
use crate::http::ServerError;
use crate::store::StoreError;

/// Start-up and request errors.
///
/// Request handlers only ever produce `Template`; the other variants are
/// returned from `main` before or after the server runs.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),

    #[error("Metrics recorder error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("HTTP server error: {0}")]
    Server(#[from] ServerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        tracing::error!(error = %self, "Request failed");

        let body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>Error {code}</title>
</head>
<body>
    <h1>Error {code}</h1>
    <p>Something went wrong while handling your request.</p>
    <a href="/">Return to the form</a>
</body>
</html>"#,
            code = status.as_u16(),
        );

        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_error_is_internal() {
        let response = AppError::Template(tera::Error::msg("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn start(step: u8) -> Result<(), AppError> {
        match step {
            0 => return Err(ConfigError::Validation("bad".to_string()).into()),
            1 => return Err(StoreError::Query(sqlx::Error::RowNotFound).into()),
            _ => {
                let config = crate::config::HttpServerConfig {
                    host: "not an address".to_string(),
                    ..Default::default()
                };
                crate::http::listen_addr(&config)?;
            }
        }
        Ok(())
    }

    #[test]
    fn test_startup_errors_convert() {
        assert!(matches!(start(0), Err(AppError::Config(_))));
        assert!(matches!(start(1), Err(AppError::Store(_))));
        match start(2) {
            Err(AppError::Server(ServerError::Address(_))) => {}
            other => panic!("expected address error, got {:?}", other),
        }
    }
}

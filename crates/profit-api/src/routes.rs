//! HTTP routes for the numeric service
//!
//! Three endpoints: a static status payload, the profit computation, and a
//! derived endpoint that evaluates a fixed request internally.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

/// Build the service router
pub fn router() -> Router {
    Router::new()
        .route("/home", get(home_handler))
        .route("/profit_company", post(profit_company_handler))
        .route("/total_profit", get(total_profit_handler))
}

// ============================================================================
// Request / response models
// ============================================================================

/// Incoming profit computation request
///
/// `month` tolerates integer, float, and numeric-string encodings; the
/// upstream clients are not consistent about which they send.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfitRequest {
    pub total: Option<i64>,
    pub month: Option<MonthValue>,
}

/// The accepted encodings of the `month` field
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MonthValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MonthValue {
    /// Numeric value of the month, if the encoding is numeric at all
    fn as_f64(&self) -> Option<f64> {
        match self {
            MonthValue::Int(n) => Some(*n as f64),
            MonthValue::Float(f) => Some(*f),
            MonthValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Whether the value is a whole number (controls the response type)
    fn is_integral(&self) -> bool {
        match self {
            MonthValue::Int(_) => true,
            MonthValue::Float(f) => f.fract() == 0.0,
            MonthValue::Text(s) => s.trim().parse::<i64>().is_ok(),
        }
    }
}

/// One field-level validation failure, 422-style
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    fn new(field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }
}

impl ProfitRequest {
    /// Validate the request: total must be a positive integer, month a
    /// number strictly between 1 and 10.
    pub fn validate(&self) -> Result<(i64, MonthValue), Vec<FieldError>> {
        let mut errors = Vec::new();

        let total = match self.total {
            Some(t) if t > 0 => Some(t),
            Some(_) => {
                errors.push(FieldError::new(
                    "total",
                    "Input should be greater than 0",
                    "greater_than",
                ));
                None
            }
            None => {
                errors.push(FieldError::new("total", "Field required", "missing"));
                None
            }
        };

        let month = match &self.month {
            Some(m) => match m.as_f64() {
                Some(value) if value > 1.0 && value < 10.0 => Some(m.clone()),
                Some(_) => {
                    errors.push(FieldError::new(
                        "month",
                        "Input should be greater than 1 and less than 10",
                        "out_of_range",
                    ));
                    None
                }
                None => {
                    errors.push(FieldError::new(
                        "month",
                        "Input should be a valid number",
                        "number_parsing",
                    ));
                    None
                }
            },
            None => {
                errors.push(FieldError::new("month", "Field required", "missing"));
                None
            }
        };

        match (total, month) {
            (Some(t), Some(m)) if errors.is_empty() => Ok((t, m)),
            _ => Err(errors),
        }
    }
}

/// Compute the profit message, keeping integer inputs integer
///
/// Returns `None` when the integer product overflows; the float path
/// saturates to infinity and never panics.
fn profit_message(total: i64, month: &MonthValue) -> Option<Value> {
    let value = month.as_f64()?;
    if month.is_integral() {
        total.checked_mul(value as i64).map(|profit| json!(profit))
    } else {
        Some(json!(total as f64 * value))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /home` - static status payload
async fn home_handler() -> Json<Value> {
    Json(json!({
        "Message": "Welcome to the gen-ai world",
        "Status": "Success"
    }))
}

/// `POST /profit_company` - multiply total by month
async fn profit_company_handler(Json(request): Json<ProfitRequest>) -> Response {
    match request.validate() {
        Ok((total, month)) => {
            debug!(total, "computing profit");
            match profit_message(total, &month) {
                Some(message) => Json(json!({ "message": message })).into_response(),
                None => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "detail": [FieldError::new(
                            "total",
                            "Profit is out of range",
                            "overflow",
                        )]
                    })),
                )
                    .into_response(),
            }
        }
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": errors })),
        )
            .into_response(),
    }
}

/// `GET /total_profit` - evaluates a fixed request internally
///
/// The `{total: 5000, month: 5}` payload is a fixed demo value.
async fn total_profit_handler() -> Response {
    let request = ProfitRequest {
        total: Some(5000),
        month: Some(MonthValue::Int(5)),
    };

    profit_company_handler(Json(request)).await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request(total: Option<i64>, month: Option<MonthValue>) -> ProfitRequest {
        ProfitRequest { total, month }
    }

    #[test]
    fn test_valid_request() {
        let (total, month) = request(Some(5000), Some(MonthValue::Int(5)))
            .validate()
            .unwrap();
        assert_eq!(total, 5000);
        assert_eq!(profit_message(total, &month), Some(json!(25000)));
    }

    #[test]
    fn test_month_as_numeric_string() {
        let (total, month) = request(Some(100), Some(MonthValue::Text("4".to_string())))
            .validate()
            .unwrap();
        assert_eq!(profit_message(total, &month), Some(json!(400)));
    }

    #[test]
    fn test_month_as_float() {
        let (total, month) = request(Some(100), Some(MonthValue::Float(2.5)))
            .validate()
            .unwrap();
        assert_eq!(profit_message(total, &month), Some(json!(250.0)));
    }

    #[test]
    fn test_overflowing_product_is_rejected_not_computed() {
        // Validation accepts the request; the product itself overflows
        let (total, month) = request(Some(i64::MAX), Some(MonthValue::Int(5)))
            .validate()
            .unwrap();
        assert_eq!(profit_message(total, &month), None);
    }

    #[test]
    fn test_missing_total_rejected() {
        let errors = request(None, Some(MonthValue::Int(5))).validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].loc, vec!["body", "total"]);
        assert_eq!(errors[0].kind, "missing");
    }

    #[test]
    fn test_non_positive_total_rejected() {
        let errors = request(Some(0), Some(MonthValue::Int(5))).validate().unwrap_err();
        assert_eq!(errors[0].kind, "greater_than");
    }

    #[test]
    fn test_month_out_of_range_rejected() {
        let errors = request(Some(100), Some(MonthValue::Int(12)))
            .validate()
            .unwrap_err();
        assert_eq!(errors[0].loc, vec!["body", "month"]);
        assert_eq!(errors[0].kind, "out_of_range");

        let errors = request(Some(100), Some(MonthValue::Int(1)))
            .validate()
            .unwrap_err();
        assert_eq!(errors[0].kind, "out_of_range");
    }

    #[test]
    fn test_non_numeric_month_rejected() {
        let errors = request(Some(100), Some(MonthValue::Text("soon".to_string())))
            .validate()
            .unwrap_err();
        assert_eq!(errors[0].kind, "number_parsing");
    }

    #[test]
    fn test_both_fields_reported() {
        let errors = request(None, None).validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn test_home_payload() {
        let Json(payload) = home_handler().await;
        assert_eq!(payload["Status"], "Success");
        assert_eq!(payload["Message"], "Welcome to the gen-ai world");
    }

    #[tokio::test]
    async fn test_total_profit_uses_fixed_payload() {
        use axum::body::to_bytes;

        let response = total_profit_handler().await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["message"], json!(25000));
    }

    #[tokio::test]
    async fn test_overflow_is_a_422_not_a_panic() {
        use axum::body::to_bytes;

        let response =
            profit_company_handler(Json(request(Some(i64::MAX), Some(MonthValue::Int(5))))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["detail"][0]["type"], "overflow");
    }

    #[tokio::test]
    async fn test_profit_company_validation_failure_is_422() {
        let response = profit_company_handler(Json(request(Some(-5), Some(MonthValue::Int(5)))))
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

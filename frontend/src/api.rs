//! Backend contracts and the gloo-net client that speaks them.

use gloo_net::http::{Request, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::AnalysisPayload;
use crate::error::{ApiError, ValidationError};
use crate::format::{format_currency, format_score};

pub const PREDICT_FAILED: &str = "Prediction failed.";
pub const UPLOAD_FAILED: &str = "Upload failed.";
pub const LOGIN_FAILED: &str = "Login failed.";
pub const REGISTER_FAILED: &str = "Registration failed.";

const UPLOAD_EXTENSIONS: [&str; 3] = [".csv", ".xlsx", ".xls"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RawInput {
    pub income: f64,
    pub expense: f64,
    pub donations: f64,
}

impl RawInput {
    /// Parses the three form fields. Blank fields count as zero.
    pub fn parse(income: &str, expense: &str, donations: &str) -> Result<Self, ValidationError> {
        fn field(raw: &str) -> Result<f64, ValidationError> {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(0.0);
            }
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(ValidationError::NonNumeric)
        }
        Ok(RawInput {
            income: field(income)?,
            expense: field(expense)?,
            donations: field(donations)?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Prediction {
    pub future_funding_required: f64,
    pub confidence_score: f64,
    pub risk_level: String,
}

impl Prediction {
    pub fn status_line(&self) -> String {
        format!(
            "Funding need: {} · Confidence: {}% · Risk: {}",
            format_currency(self.future_funding_required),
            format_score(self.confidence_score),
            self.risk_level
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct UploadResponse {
    status: Option<String>,
    analysis: Option<AnalysisPayload>,
    detail: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Identity {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    pub email: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Failure carrying the body's `detail` verbatim when there is one.
pub fn backend_failure(body: &str, fallback: &str) -> ApiError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|detail| match detail {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });
    ApiError::Backend(detail.unwrap_or_else(|| fallback.to_string()))
}

pub fn interpret<T: DeserializeOwned>(ok: bool, body: &str, fallback: &str) -> Result<T, ApiError> {
    if !ok {
        return Err(backend_failure(body, fallback));
    }
    serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// An upload only succeeds when the body says `"status": "success"`, even
/// on a 2xx response.
pub fn interpret_upload(ok: bool, body: &str) -> Result<AnalysisPayload, ApiError> {
    let response: UploadResponse = interpret(ok, body, UPLOAD_FAILED)?;
    if response.status.as_deref() != Some("success") {
        return Err(ApiError::Backend(
            response.detail.unwrap_or_else(|| UPLOAD_FAILED.to_string()),
        ));
    }
    response
        .analysis
        .ok_or_else(|| ApiError::Decode("response has no analysis".to_string()))
}

pub fn interpret_register(ok: bool, body: &str) -> Result<(), ApiError> {
    if ok {
        Ok(())
    } else {
        Err(backend_failure(body, REGISTER_FAILED))
    }
}

pub fn check_upload_name(name: Option<&str>) -> Result<(), ValidationError> {
    let name = name.ok_or(ValidationError::NoFile)?.to_lowercase();
    if UPLOAD_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedFile)
    }
}

#[allow(async_fn_in_trait)]
pub trait AuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<Identity, ApiError>;
    async fn register(&self, credentials: &Credentials) -> Result<(), ApiError>;
}

#[allow(async_fn_in_trait)]
pub trait AnalysisApi {
    type File;

    async fn predict(&self, input: &RawInput) -> Result<Prediction, ApiError>;
    async fn upload(&self, file: &Self::File) -> Result<AnalysisPayload, ApiError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpClient {
    base: String,
}

impl HttpClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Request, ApiError> {
        Request::post(&self.url(path))
            .json(body)
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn send(&self, request: Request) -> Result<(bool, String), ApiError> {
        let url = request.url();
        let resp = request.send().await.map_err(|err| {
            log::error!("POST {} failed: {}", url, err);
            ApiError::Transport(err.to_string())
        })?;
        let body = resp.text().await.map_err(|err| {
            log::error!("reading {} response failed: {}", url, err);
            ApiError::Transport(err.to_string())
        })?;
        if !resp.ok() {
            log::warn!("POST {} returned {}", url, resp.status());
        }
        Ok((resp.ok(), body))
    }

    fn builder(&self, path: &str) -> RequestBuilder {
        Request::post(&self.url(path))
    }
}

impl AuthApi for HttpClient {
    async fn login(&self, credentials: &Credentials) -> Result<Identity, ApiError> {
        let (ok, body) = self.send(self.post_json("/auth/login", credentials)?).await?;
        interpret(ok, &body, LOGIN_FAILED)
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let (ok, body) = self.send(self.post_json("/auth/register", credentials)?).await?;
        interpret_register(ok, &body)
    }
}

impl AnalysisApi for HttpClient {
    type File = web_sys::File;

    async fn predict(&self, input: &RawInput) -> Result<Prediction, ApiError> {
        let (ok, body) = self.send(self.post_json("/predict", input)?).await?;
        interpret(ok, &body, PREDICT_FAILED)
    }

    async fn upload(&self, file: &web_sys::File) -> Result<AnalysisPayload, ApiError> {
        let form = web_sys::FormData::new()
            .map_err(|err| ApiError::Decode(format!("{:?}", err)))?;
        form.append_with_blob_and_filename("file", file, &file.name())
            .map_err(|err| ApiError::Decode(format!("{:?}", err)))?;
        let request = self
            .builder("/upload-file")
            .body(form)
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        let (ok, body) = self.send(request).await?;
        interpret_upload(ok, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_fields() {
        let input = RawInput::parse("1000", " 250.5 ", "").unwrap();
        assert_eq!(input.income, 1000.0);
        assert_eq!(input.expense, 250.5);
        assert_eq!(input.donations, 0.0);
        assert_eq!(
            RawInput::parse("abc", "1", "1"),
            Err(ValidationError::NonNumeric)
        );
        assert_eq!(RawInput::parse("1", "NaN", "1"), Err(ValidationError::NonNumeric));
    }

    #[test]
    fn predict_body_uses_wire_names() {
        let body = serde_json::to_value(RawInput {
            income: 1.0,
            expense: 2.0,
            donations: 3.0,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"income": 1.0, "expense": 2.0, "donations": 3.0}));
    }

    #[test]
    fn non_2xx_uses_detail_verbatim() {
        let err = interpret::<Prediction>(false, r#"{"detail": "Model not loaded"}"#, PREDICT_FAILED);
        assert_eq!(err, Err(ApiError::Backend("Model not loaded".into())));
        assert_eq!(err.unwrap_err().to_string(), "Model not loaded");
    }

    #[test]
    fn non_2xx_without_detail_uses_fallback() {
        let err = interpret::<Identity>(false, "Internal Server Error", LOGIN_FAILED).unwrap_err();
        assert_eq!(err.to_string(), "Login failed.");
    }

    #[test]
    fn undecodable_2xx_body_is_a_backend_error() {
        let err = interpret::<Identity>(true, "not json", LOGIN_FAILED).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.to_string(), "Unexpected response from backend.");
        assert_eq!(
            crate::error::AuthError::from(err),
            crate::error::AuthError::Backend("Unexpected response from backend.".into())
        );
    }

    #[test]
    fn prediction_status_line() {
        let prediction: Prediction = interpret(
            true,
            r#"{"status":"success","future_funding_required":150000,"confidence_score":87.5,"risk_level":"Medium"}"#,
            PREDICT_FAILED,
        )
        .unwrap();
        assert_eq!(
            prediction.status_line(),
            "Funding need: ₹1,50,000.00 · Confidence: 87.5% · Risk: Medium"
        );
    }

    #[test]
    fn upload_requires_success_status() {
        let failed = interpret_upload(true, r#"{"status": "error", "detail": "bad columns"}"#);
        assert_eq!(failed, Err(ApiError::Backend("bad columns".into())));

        let no_detail = interpret_upload(true, r#"{"status": "pending"}"#);
        assert_eq!(no_detail, Err(ApiError::Backend(UPLOAD_FAILED.into())));

        let ok = interpret_upload(
            true,
            r#"{"status": "success", "rows_processed": 3, "analysis": {"total_income": 5.0}}"#,
        )
        .unwrap();
        assert_eq!(ok.total_income, Some(5.0));
    }

    #[test]
    fn upload_http_error_reads_detail() {
        let err = interpret_upload(false, r#"{"detail": "Unsupported file type. Upload CSV or Excel."}"#);
        assert_eq!(
            err,
            Err(ApiError::Backend("Unsupported file type. Upload CSV or Excel.".into()))
        );
    }

    #[test]
    fn identity_accepts_numeric_user_id() {
        let id: Identity = serde_json::from_str(r#"{"user_id": 42, "email": "a@b.com"}"#).unwrap();
        assert_eq!(id.user_id, "42");
        let id: Identity = serde_json::from_str(r#"{"user_id": "u-1", "email": "a@b.com"}"#).unwrap();
        assert_eq!(id.user_id, "u-1");
    }

    #[test]
    fn upload_names_are_checked_before_sending() {
        assert_eq!(check_upload_name(None), Err(ValidationError::NoFile));
        assert_eq!(check_upload_name(Some("q1.CSV")), Ok(()));
        assert_eq!(check_upload_name(Some("books.xlsx")), Ok(()));
        assert_eq!(
            check_upload_name(Some("notes.pdf")),
            Err(ValidationError::UnsupportedFile)
        );
    }

    #[test]
    fn register_failure_detail() {
        assert_eq!(interpret_register(true, ""), Ok(()));
        assert_eq!(
            interpret_register(false, r#"{"detail": "Email already registered"}"#),
            Err(ApiError::Backend("Email already registered".into()))
        );
    }
}

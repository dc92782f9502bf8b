//! HTTP responses produced at the bridge boundary
//!
//! Error bodies share one JSON shape:
//! {
//!   "error": "snake_code",
//!   "message": "Human readable detail"
//! }

use crate::error::CredentialError;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderValue, Response, StatusCode};
use http_body_util::Full;

pub type Body = Full<Bytes>;

#[inline]
fn body_from<T: Into<Bytes>>(data: T) -> Body {
    Full::new(data.into())
}

pub fn json_error(status: StatusCode, code: &str, message: &str) -> Response<Body> {
    let body = serde_json::json!({ "error": code, "message": message }).to_string();
    let mut response = Response::new(body_from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// 401 for a rejected Shibboleth token
pub fn unauthorized(cause: &CredentialError) -> Response<Body> {
    json_error(StatusCode::UNAUTHORIZED, "bad_credentials", &cause.to_string())
}

/// 302 to `location`
pub fn redirect(location: &str) -> Result<Response<Body>, http::header::InvalidHeaderValue> {
    let mut response = Response::new(body_from(Bytes::new()));
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(LOCATION, HeaderValue::from_str(location)?);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_body() {
        let cause = CredentialError::AuthenticationMethodNotAllowed { method: "urn:pwd".to_string() };
        let response = unauthorized(&cause);

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let json = body_json(response).await;
        assert_eq!(json["error"], "bad_credentials");
        assert_eq!(json["message"], "authentication method: urn:pwd, not allowed");
    }

    #[tokio::test]
    async fn test_json_error_escapes_message() {
        let json = body_json(json_error(StatusCode::BAD_REQUEST, "bad", "say \"hi\"")).await;
        assert_eq!(json["message"], "say \"hi\"");
    }

    #[test]
    fn test_redirect() {
        let response = redirect("/Shibboleth.sso/Login?target=%2Fapp").unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/Shibboleth.sso/Login?target=%2Fapp");

        assert!(redirect("/bad\nlocation").is_err());
    }
}

// src/server/correlation.rs
use hyper::Request;
use uuid::Uuid;

/// Header used to carry a request id across service boundaries.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Per-request identifier threaded through the request's log span and
/// echoed back in the response headers. Callers that supply their own
/// id keep it, so traces line up across services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn from_request<T>(req: &Request<T>) -> Self {
        req.headers()
            .get(CORRELATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|value| Self(value.to_string()))
            .unwrap_or_else(Self::generate)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Body;

    #[test]
    fn reuses_the_caller_supplied_id() {
        let req = Request::builder()
            .header(CORRELATION_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();

        assert_eq!(CorrelationId::from_request(&req).as_str(), "abc-123");
    }

    #[test]
    fn generates_an_id_when_the_header_is_missing_or_empty() {
        let bare = Request::builder().body(Body::empty()).unwrap();
        let blank = Request::builder()
            .header(CORRELATION_HEADER, "")
            .body(Body::empty())
            .unwrap();

        let a = CorrelationId::from_request(&bare);
        let b = CorrelationId::from_request(&blank);

        assert!(!a.as_str().is_empty());
        assert!(!b.as_str().is_empty());
        assert_ne!(a, b);
    }
}

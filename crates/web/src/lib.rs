use http::HeaderMap;

pub mod response;

/// Header carrying the correlation ID assigned by the platform router.
pub const VCAP_REQUEST_ID_HEADER: &str = "X-Vcap-Request-Id";

/// Returns the trimmed correlation ID of a request, if the router set one.
#[must_use]
pub fn get_vcap_request_id(headers: &HeaderMap) -> Option<String> {
    let request_id = headers
        .get(VCAP_REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);

    tracing::debug!(?request_id);

    request_id
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    #[test]
    fn test_get_vcap_request_id() {
        let mut headers = HeaderMap::new();
        assert_eq!(get_vcap_request_id(&headers), None);

        let _previous =
            headers.insert(VCAP_REQUEST_ID_HEADER, HeaderValue::from_static(" some-request-id "));
        assert_eq!(get_vcap_request_id(&headers).as_deref(), Some("some-request-id"));

        let _previous = headers.insert(VCAP_REQUEST_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(get_vcap_request_id(&headers), None);
    }
}

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

/// Name of the cookie carrying the login token.
pub(crate) const JWT_COOKIE: &str = "jwt";

/// Token presented by the client, if any. The Authorization header wins over
/// the `jwt` cookie when both are present. Extraction itself never rejects;
/// each handler decides what a missing token means at its own boundary.
pub struct BearerToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(token_from_headers(&parts.headers)))
    }
}

pub(crate) fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }
    cookie_value(headers, JWT_COOKIE)
}

pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(entries: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.insert(name.clone(), HeaderValue::from_str(value).expect("ascii"));
        }
        map
    }

    #[test]
    fn reads_bearer_header() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(token_from_headers(&map).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn reads_jwt_cookie() {
        let map = headers(&[(header::COOKIE, "theme=dark; jwt=abc.def.ghi; lang=en")]);
        assert_eq!(token_from_headers(&map).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn header_wins_over_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "jwt=from-cookie"),
        ]);
        assert_eq!(token_from_headers(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn absent_everywhere_is_none() {
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn ignores_wrong_scheme_and_empty_values() {
        let map = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert_eq!(token_from_headers(&map), None);

        let map = headers(&[(header::COOKIE, "jwt=")]);
        assert_eq!(token_from_headers(&map), None);
    }
}

//! Bearer-token verification middleware for axum
//!
//! A tower `Layer`/`Service` pair constructed for one fixed token service
//! and required token type. The layer extracts the `Authorization: Bearer`
//! header, verifies the token under the pinned algorithm, and on success
//! inserts the verified claims into request extensions for handlers to read
//! through the [`VerifiedClaims`] extractor.
//!
//! Every failure produces the same uniform 401 body; the concrete cause is
//! visible only in tracing output.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::error::{AuthError, ErrorResponse};
use crate::keys::Algorithm;
use crate::token::TokenService;
use crate::types::{TokenClaims, TokenType};

/// Verified-request context, attached to responses for the request logger
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject of the verified token
    pub user_id: String,
    /// Algorithm the token was verified under
    pub algorithm: Algorithm,
    /// Type of the verified token
    pub token_type: TokenType,
}

/// Bearer verification layer for one (algorithm, token type) gate
#[derive(Clone)]
pub struct BearerAuthLayer {
    tokens: Arc<TokenService>,
    required_type: TokenType,
}

impl BearerAuthLayer {
    /// Gate requiring an access token
    pub fn access(tokens: Arc<TokenService>) -> Self {
        Self {
            tokens,
            required_type: TokenType::Access,
        }
    }

    /// Gate requiring a refresh token
    pub fn refresh(tokens: Arc<TokenService>) -> Self {
        Self {
            tokens,
            required_type: TokenType::Refresh,
        }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuth {
            inner,
            tokens: self.tokens.clone(),
            required_type: self.required_type,
        }
    }
}

/// Bearer verification middleware service
#[derive(Clone)]
pub struct BearerAuth<S> {
    inner: S,
    tokens: Arc<TokenService>,
    required_type: TokenType,
}

impl<S> Service<Request> for BearerAuth<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let tokens = self.tokens.clone();
        let required_type = self.required_type;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let verified = extract_bearer(req.headers())
                .and_then(|token| tokens.verify(token, required_type));

            let claims = match verified {
                Ok(claims) => claims,
                Err(e) => {
                    tracing::debug!(
                        algorithm = %tokens.algorithm(),
                        required_type = %required_type,
                        error = %e,
                        "bearer verification failed"
                    );
                    return Ok(auth_error_response(e));
                }
            };

            let context = AuthContext {
                user_id: claims.sub.clone(),
                algorithm: tokens.algorithm(),
                token_type: required_type,
            };

            let (mut parts, body) = req.into_parts();
            parts.extensions.insert(claims);
            let req = Request::from_parts(parts, body);

            let mut response = inner.call(req).await?;
            // Surfaced on the response so the outermost request logger can
            // attribute the request after the stack unwinds
            response.extensions_mut().insert(context);
            Ok(response)
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
///
/// Any other shape (missing header, wrong scheme, empty token) fails before
/// any cryptographic work.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MissingToken)?;

    let token = value.strip_prefix("Bearer ").ok_or(AuthError::MissingToken)?;
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Create the uniform error response for authentication failures
pub fn auth_error_response(error: AuthError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::from(&error);

    Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap_or_default()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

// =============================================================================
// Axum Extractors
// =============================================================================

/// Extractor for claims verified by [`BearerAuth`]
///
/// Returns the uniform 401 if the route was not behind a bearer gate.
pub struct VerifiedClaims(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for VerifiedClaims
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenClaims>()
            .cloned()
            .map(VerifiedClaims)
            .ok_or_else(|| auth_error_response(AuthError::MissingToken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::AUTHORIZATION;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_bearer_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(extract_bearer(&headers), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_extract_bearer_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(matches!(extract_bearer(&headers), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_extract_bearer_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert!(matches!(extract_bearer(&headers), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_auth_error_response_is_uniform_401() {
        for error in [
            AuthError::MissingToken,
            AuthError::TokenExpired,
            AuthError::InvalidToken,
            AuthError::InvalidTokenType,
            AuthError::AlgorithmMismatch,
        ] {
            let response = auth_error_response(error);
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_config_fault_maps_to_500() {
        let response = auth_error_response(AuthError::Config("no es256 keys".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

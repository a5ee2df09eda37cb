//! Per-request language detection.
//!
//! Signals, highest priority first: `?lang=`, `X-Language`,
//! `Accept-Language`, the `lang` claim of a valid session token, the
//! `lang` cookie. The resolved [`FallbackChain`] is stored in the
//! request extensions, error bodies are re-rendered in that language
//! and `Content-Language` is set on every response.

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_LANGUAGE, COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use canvass_auth::AuthConfig;
use canvass_auth::token::decode_session_token;
use canvass_core::language::{FallbackChain, LanguageSignals, detect_language, fallback_chain};

use crate::error::ErrorInfo;

pub const LANGUAGE_HEADER: &str = "x-language";
pub const LANGUAGE_PARAM: &str = "lang";
pub const LANGUAGE_COOKIE: &str = "lang";

/// Fallback chain detected for the current request.
#[derive(Debug, Clone, Default)]
pub struct RequestLanguage(pub FallbackChain);

impl<S: Send + Sync> FromRequestParts<S> for RequestLanguage {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestLanguage>()
            .cloned()
            .unwrap_or_default())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, AUTHORIZATION)?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then_some(value)
    })
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
}

fn request_chain(req: &Request, auth: &AuthConfig) -> FallbackChain {
    let headers = req.headers();
    // Only a verifiable token contributes its language.
    let session_lang = bearer_token(headers)
        .and_then(|token| decode_session_token(token, auth).ok())
        .and_then(|claims| claims.lang);

    let signals = LanguageSignals {
        query: req.uri().query().and_then(|q| query_param(q, LANGUAGE_PARAM)),
        header: header_str(headers, LANGUAGE_HEADER),
        accept_language: header_str(headers, ACCEPT_LANGUAGE),
        context: session_lang.as_deref(),
        cookie: cookie_value(headers, LANGUAGE_COOKIE),
    };
    fallback_chain(&detect_language(&signals))
}

pub async fn detect_request_language(
    State(auth): State<Arc<AuthConfig>>,
    mut req: Request,
    next: Next,
) -> Response {
    let chain = request_chain(&req, &auth);
    req.extensions_mut().insert(RequestLanguage(chain.clone()));

    let mut response = next.run(req).await;

    if let Some(info) = response.extensions().get::<ErrorInfo>().cloned() {
        let status = response.status();
        response = (status, Json(info.body(&chain))).into_response();
        response.extensions_mut().insert(info);
    }
    if let Ok(value) = HeaderValue::from_str(chain.primary()) {
        response.headers_mut().insert(CONTENT_LANGUAGE, value);
    }
    response
}

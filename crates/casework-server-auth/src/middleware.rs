// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential extraction from request headers.

use http::header::AUTHORIZATION;
use http::HeaderMap;
use tracing::instrument;

use crate::error::AuthError;
use crate::token::BearerToken;

const BEARER_PREFIX: &str = "Bearer ";

/// Parse an `Authorization` header value.
///
/// Only the exact form `Bearer <token>` is accepted. The scheme is
/// case-sensitive and the token must be non-empty with no whitespace.
pub fn extract_bearer_token(value: &str) -> Result<BearerToken, AuthError> {
	let token = value
		.strip_prefix(BEARER_PREFIX)
		.ok_or(AuthError::MalformedCredential)?;

	if token.is_empty() || token.chars().any(char::is_whitespace) {
		return Err(AuthError::MalformedCredential);
	}

	Ok(BearerToken::new(token))
}

/// Extract the bearer token from the `Authorization` header.
///
/// A missing header is [`AuthError::AuthenticationRequired`]; a present but
/// unusable one is [`AuthError::MalformedCredential`].
#[instrument(level = "trace", skip_all, fields(has_auth_header))]
pub fn extract_bearer_token_from_headers(headers: &HeaderMap) -> Result<BearerToken, AuthError> {
	let header = headers.get(AUTHORIZATION);
	tracing::Span::current().record("has_auth_header", header.is_some());

	let header = header.ok_or(AuthError::AuthenticationRequired)?;
	let value = header.to_str().map_err(|_| AuthError::MalformedCredential)?;
	extract_bearer_token(value)
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::header::HeaderValue;

	mod bearer_value {
		use super::*;

		#[test]
		fn accepts_exact_form() {
			let token = extract_bearer_token("Bearer cw_abc123").unwrap();
			assert_eq!(token.expose(), "cw_abc123");
		}

		#[test]
		fn rejects_other_schemes() {
			for value in ["Basic dXNlcjpwYXNz", "Token abc", "abc"] {
				assert_eq!(
					extract_bearer_token(value),
					Err(AuthError::MalformedCredential),
					"{value}"
				);
			}
		}

		#[test]
		fn scheme_is_case_sensitive() {
			assert_eq!(
				extract_bearer_token("bearer abc"),
				Err(AuthError::MalformedCredential)
			);
		}

		#[test]
		fn rejects_empty_or_spaced_tokens() {
			for value in ["Bearer ", "Bearer", "Bearer  abc", "Bearer abc def", "Bearer abc\t"] {
				assert_eq!(
					extract_bearer_token(value),
					Err(AuthError::MalformedCredential),
					"{value:?}"
				);
			}
		}
	}

	mod headers {
		use super::*;

		#[test]
		fn missing_header_requires_authentication() {
			let headers = HeaderMap::new();
			assert_eq!(
				extract_bearer_token_from_headers(&headers),
				Err(AuthError::AuthenticationRequired)
			);
		}

		#[test]
		fn reads_authorization_header() {
			let mut headers = HeaderMap::new();
			headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
			let token = extract_bearer_token_from_headers(&headers).unwrap();
			assert_eq!(token.expose(), "tok");
		}

		#[test]
		fn non_utf8_header_is_malformed() {
			let mut headers = HeaderMap::new();
			headers.insert(
				AUTHORIZATION,
				HeaderValue::from_bytes(b"Bearer \xfftok").unwrap(),
			);
			assert_eq!(
				extract_bearer_token_from_headers(&headers),
				Err(AuthError::MalformedCredential)
			);
		}
	}
}

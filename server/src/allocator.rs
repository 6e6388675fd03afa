//! Short code allocation: validates requests, generates codes, and inserts the
//! new link under the store's uniqueness constraint.

use crate::{
    db::{self, InsertOutcome},
    error::AllocationError,
    models::Link,
};
use rand::{distributions::Alphanumeric, Rng};
use sqlx::SqlitePool;

/// Length of randomly generated codes.
pub const GENERATED_CODE_LEN: usize = 6;

/// Accepted length range for user-supplied codes.
pub const MIN_CODE_LEN: usize = 6;
pub const MAX_CODE_LEN: usize = 8;

/// Codes that collide with fixed top-level routes and could never redirect.
pub const RESERVED_CODES: &[&str] = &["healthz"];

/// Default bound on generate-and-insert attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Create a link for `target_url`, using `requested_code` when given or a
/// random code otherwise.
pub async fn allocate(
    pool: &SqlitePool,
    requested_code: Option<&str>,
    target_url: &str,
    max_attempts: u32,
) -> Result<Link, AllocationError> {
    allocate_with(pool, requested_code, target_url, max_attempts, generate_code).await
}

/// Same as [`allocate`] with a caller-supplied code generator.
pub async fn allocate_with<G>(
    pool: &SqlitePool,
    requested_code: Option<&str>,
    target_url: &str,
    max_attempts: u32,
    mut generate: G,
) -> Result<Link, AllocationError>
where
    G: FnMut() -> String,
{
    let target_url = validate_target_url(target_url)?;
    // Only a missing or empty code means "generate"; anything else is taken
    // verbatim and must be well formed.
    let requested_code = requested_code.filter(|s| !s.is_empty());

    if let Some(code) = requested_code {
        if !is_valid_code(code) {
            return Err(AllocationError::InvalidCodeFormat);
        }

        return match db::insert_unique(pool, code, &target_url).await? {
            InsertOutcome::Created(link) => {
                tracing::info!("Created link '{}' -> {}", link.code, link.target_url);
                Ok(link)
            }
            InsertOutcome::Conflict => {
                tracing::debug!("Custom code '{}' is already taken", code);
                Err(AllocationError::CodeAlreadyExists(code.to_owned()))
            }
        };
    }

    for attempt in 1..=max_attempts {
        let code = generate();
        match db::insert_unique(pool, &code, &target_url).await? {
            InsertOutcome::Created(link) => {
                tracing::info!("Created link '{}' -> {}", link.code, link.target_url);
                return Ok(link);
            }
            InsertOutcome::Conflict => {
                tracing::warn!(
                    "Generated code '{}' collided (attempt {}/{})",
                    code,
                    attempt,
                    max_attempts
                );
            }
        }
    }

    tracing::error!("Code generation exhausted after {} attempts", max_attempts);
    Err(AllocationError::AllocationExhausted {
        attempts: max_attempts,
    })
}

/// `true` if `code` is 6-8 ASCII letters or digits and not a reserved route.
pub fn is_valid_code(code: &str) -> bool {
    (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len())
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
        && !RESERVED_CODES.contains(&code)
}

/// Trim and check that `raw` is an absolute http(s) URL with a host.
pub fn validate_target_url(raw: &str) -> Result<String, AllocationError> {
    let trimmed = raw.trim();
    // The url parser silently drops tabs and newlines; the raw value ends up
    // in a Location header, so refuse them outright.
    if trimmed.chars().any(char::is_control) {
        return Err(AllocationError::InvalidTargetUrl);
    }
    let parsed = url::Url::parse(trimmed).map_err(|_| AllocationError::InvalidTargetUrl)?;

    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(trimmed.to_owned()),
        _ => Err(AllocationError::InvalidTargetUrl),
    }
}

/// Draw a random code, each character uniform over `[A-Za-z0-9]`.
pub fn generate_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_CODE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_alphanumerics() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), GENERATED_CODE_LEN);
            assert!(is_valid_code(&code), "bad generated code {code}");
        }
    }

    #[test]
    fn code_format_bounds() {
        assert!(is_valid_code("abc123"));
        assert!(is_valid_code("MYLINK1"));
        assert!(is_valid_code("ABCDefg8"));
        assert!(!is_valid_code("ab"));
        assert!(!is_valid_code("abcde"));
        assert!(!is_valid_code("abcdefghi"));
        assert!(!is_valid_code("abc-123"));
        assert!(!is_valid_code("abc 123"));
        assert!(!is_valid_code("ábcdef"));
        assert!(!is_valid_code(" abc123"));
        assert!(!is_valid_code("healthz"));
        assert!(is_valid_code("HEALTHZ"));
    }

    #[test]
    fn target_url_requires_http_scheme_and_host() {
        assert_eq!(
            validate_target_url("  https://example.com/path?q=1 ").unwrap(),
            "https://example.com/path?q=1"
        );
        assert!(validate_target_url("http://localhost:8080").is_ok());
        assert!(matches!(
            validate_target_url("ftp://x.com"),
            Err(AllocationError::InvalidTargetUrl)
        ));
        assert!(validate_target_url("example.com").is_err());
        assert!(validate_target_url("/relative/path").is_err());
        assert!(validate_target_url("mailto:someone@example.com").is_err());
        assert!(validate_target_url("").is_err());
        assert!(validate_target_url("https://exa\nmple.com").is_err());
    }
}

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::claims::AccessClaims;

/// Verify an HS256 access token issued by the authentication service.
pub fn validate_jwt(
    token: &str,
    secret: &str,
    expected_issuer: Option<&str>,
) -> Result<AccessClaims, String> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    // Set up validation
    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(issuer) = expected_issuer {
        validation.set_issuer(&[issuer]);
    }
    validation.validate_exp = true;

    let token_data = decode::<AccessClaims>(token, &decoding_key, &validation)
        .map_err(|e| format!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

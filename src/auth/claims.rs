use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    pub sub: String,          // User id as a decimal string
    pub exp: i64,             // Expiration timestamp
    pub iat: i64,             // Issued at timestamp
    pub iss: Option<String>,  // Issuer
    pub role: Option<String>, // "Employee", "Manager" or "Admin"
}

impl AccessClaims {
    pub fn user_id(&self) -> Result<i32, String> {
        self.sub
            .parse()
            .map_err(|_| format!("Subject '{}' is not a user id", self.sub))
    }
}

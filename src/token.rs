use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    libs::{
        cache::{is_revoked, not_before},
        time::TIME,
    },
    Response,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// 用户id
    pub id: String,
    /// 签发时间，毫秒
    pub iat: i64,
    /// 过期时间，毫秒
    pub exp: i64,
}

#[derive(Debug, PartialEq)]
pub enum TokenVerification {
    Ok(Claims),
    Expired,
    /// 登出或停用之前签发的
    Revoked,
    Error,
}

/// HS256 签发和校验
#[derive(Clone)]
pub struct TokenIssuer {
    key: Hmac<Sha256>,
    ttl_ms: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_ms", &self.ttl_ms)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, hours: i64) -> Result<Self, Response> {
        let key = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(Response::internal_server_error)?;
        Ok(Self {
            key,
            ttl_ms: hours.max(1) * 3_600_000,
        })
    }

    /// 签发时间不早于该用户的吊销时间，刚登出或改密码后立即签发也有效
    pub fn generate(&self, id: &str) -> Result<String, Response> {
        let iat = TIME::now().millis().max(not_before(id).unwrap_or(0));
        self.sign(Claims {
            id: id.to_owned(),
            iat,
            exp: iat + self.ttl_ms,
        })
    }

    fn sign(&self, claims: Claims) -> Result<String, Response> {
        Ok(claims.sign_with_key(&self.key)?)
    }

    pub fn verify(&self, token: &str) -> TokenVerification {
        let claims = match VerifyWithKey::<Claims>::verify_with_key(token, &self.key) {
            Ok(claims) => claims,
            Err(_) => return TokenVerification::Error,
        };
        if claims.exp <= TIME::now().millis() {
            TokenVerification::Expired
        } else if is_revoked(&claims.id, claims.iat) {
            TokenVerification::Revoked
        } else {
            TokenVerification::Ok(claims)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::cache::revoke_tokens;

    #[test]
    fn generated_token_verifies() {
        let issuer = TokenIssuer::new("secret", 1).unwrap();
        let token = issuer.generate("U-token-ok").unwrap();
        match issuer.verify(&token) {
            TokenVerification::Ok(claims) => assert_eq!(claims.id, "U-token-ok"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wrong_secret_and_garbage_fail() {
        let issuer = TokenIssuer::new("secret", 1).unwrap();
        let other = TokenIssuer::new("other", 1).unwrap();
        let token = issuer.generate("U-token-key").unwrap();
        assert_eq!(other.verify(&token), TokenVerification::Error);
        assert_eq!(issuer.verify("not-a-token"), TokenVerification::Error);
    }

    #[test]
    fn expired_token() {
        let issuer = TokenIssuer::new("secret", 1).unwrap();
        let token = issuer
            .sign(Claims {
                id: "U-token-old".into(),
                iat: 0,
                exp: 1,
            })
            .unwrap();
        assert_eq!(issuer.verify(&token), TokenVerification::Expired);
    }

    #[test]
    fn revoked_token() {
        let issuer = TokenIssuer::new("secret", 1).unwrap();
        let token = issuer.generate("U-token-revoked").unwrap();
        revoke_tokens("U-token-revoked", TIME::now().millis());
        assert_eq!(issuer.verify(&token), TokenVerification::Revoked);
        let fresh = issuer.generate("U-token-revoked").unwrap();
        assert!(matches!(issuer.verify(&fresh), TokenVerification::Ok(_)));
    }
}

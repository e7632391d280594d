// src/auth.rs
use crate::error::{ChatError, Result};
use crate::models::{PublicProfile, RegisterFields};
use crate::users::UserStore;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    // 用户名
    pub sub: String,
    pub iat: i64,
}

// HS256 签发与校验，密钥来自启动配置
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 本层不签发过期时间，也不校验
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, username: &str) -> Result<String> {
        let claims = Claims {
            sub: username.to_string(),
            iat: chrono::Utc::now().timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<String> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims.sub)
    }
}

// 无状态的登录/注册流程，组合用户存储与令牌签发
#[derive(Clone)]
pub struct AuthFlow {
    users: UserStore,
    tokens: TokenIssuer,
}

impl AuthFlow {
    pub fn new(users: UserStore, tokens: TokenIssuer) -> Self {
        Self { users, tokens }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        if !self.users.authenticate(username, password).await? {
            return Err(ChatError::Auth("用户名或密码错误".to_string()));
        }
        self.users.update_login_timestamp(username).await?;
        self.tokens.issue(username)
    }

    pub async fn register(&self, fields: &RegisterFields) -> Result<(String, PublicProfile)> {
        let created = self.users.register(fields).await?;
        self.users.update_login_timestamp(&created.username).await?;
        let token = self.tokens.issue(&created.username)?;
        // 密码哈希到此为止，不再向外传递
        Ok((
            token,
            PublicProfile {
                username: created.username,
                first_name: created.first_name,
                last_name: created.last_name,
                phone: created.phone,
            },
        ))
    }

    pub fn verify_token(&self, token: &str) -> Result<String> {
        self.tokens.verify(token)
    }
}

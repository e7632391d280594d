// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("参数无效: {0}")]
    Validation(String),
    #[error("冲突: {0}")]
    Conflict(String),
    #[error("认证失败: {0}")]
    Auth(String),
    #[error("未找到: {0}")]
    NotFound(String),
    #[error("数据库错误: {0}")]
    Db(#[from] sqlx::Error),
    #[error("密码哈希错误: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("令牌错误: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl ChatError {
    // 建议的传输层状态码，本层不做传输编码
    pub fn status_hint(&self) -> u16 {
        match self {
            ChatError::Validation(_) => 400,
            ChatError::Auth(_) | ChatError::Token(_) => 401,
            ChatError::NotFound(_) => 404,
            ChatError::Conflict(_) => 409,
            ChatError::Db(_) | ChatError::Hash(_) => 500,
        }
    }
}

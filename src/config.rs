// src/config.rs
use anyhow::{Context, Result};
use std::env;

// 进程级配置，启动时一次性读取并注入各组件
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub secret_key: String,
    pub bcrypt_cost: u32,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // 加载环境变量
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL 环境变量未设置")?;
        let secret_key = env::var("SECRET_KEY").context("SECRET_KEY 环境变量未设置")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(v) => v.parse().context("BCRYPT_COST 必须是整数")?,
            Err(_) => bcrypt::DEFAULT_COST,
        };
        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v.parse().context("DB_MAX_CONNECTIONS 必须是整数")?,
            Err(_) => 20,
        };

        Ok(Self {
            database_url,
            bind_addr,
            secret_key,
            bcrypt_cost,
            db_max_connections,
        })
    }
}

// src/db.rs
use crate::config::Config;
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

pub async fn init_db_pool(config: &Config) -> Result<SqlitePool> {
    // 外键约束必须显式打开，消息表依赖它拦截无效的收发方
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(options)
        .await?;

    // 创建用户表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY,
            password TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            phone TEXT NOT NULL,
            join_at TEXT NOT NULL,
            last_login_at TEXT NOT NULL
        );
        "#,
    )
    .execute(&pool)
    .await?;

    // 创建消息表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            from_username TEXT NOT NULL REFERENCES users(username),
            to_username TEXT NOT NULL REFERENCES users(username),
            body TEXT NOT NULL,
            sent_at TEXT NOT NULL,
            read_at TEXT
        );
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

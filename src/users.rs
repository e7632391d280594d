// src/users.rs
use crate::error::{ChatError, Result};
use crate::models::{PublicProfile, ReceivedMessage, RegisterFields, SentMessage, User, UserProfile};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
    bcrypt_cost: u32,
}

impl UserStore {
    pub fn new(pool: SqlitePool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    // 注册新用户。返回值包含密码哈希，只允许在存储层内部使用，
    // 对外一律经过 AuthFlow 剥离后再返回
    pub async fn register(&self, fields: &RegisterFields) -> Result<User> {
        for (name, value) in [
            ("username", &fields.username),
            ("password", &fields.password),
            ("first_name", &fields.first_name),
            ("last_name", &fields.last_name),
            ("phone", &fields.phone),
        ] {
            if value.trim().is_empty() {
                return Err(ChatError::Validation(format!("字段 {} 不能为空", name)));
            }
        }

        let hashed = bcrypt::hash(&fields.password, self.bcrypt_cost)?;
        let now = Utc::now();

        let res = sqlx::query(
            "INSERT INTO users (username, password, first_name, last_name, phone, join_at, last_login_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&fields.username)
        .bind(&hashed)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.phone)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(User {
                username: fields.username.clone(),
                password: hashed,
                first_name: fields.first_name.clone(),
                last_name: fields.last_name.clone(),
                phone: fields.phone.clone(),
                join_at: now,
                last_login_at: now,
            }),
            // 主键冲突 = 用户名已被占用，靠存储层的唯一约束裁决并发注册
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                ChatError::Conflict(format!("用户名 {} 已存在", fields.username)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    // 用户不存在时报错，密码不匹配只返回 false
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let row = sqlx::query("SELECT password FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(ChatError::Auth(format!("用户 {} 不存在", username)));
        };

        let hash: String = row.try_get("password")?;
        Ok(bcrypt::verify(password, &hash)?)
    }

    pub async fn update_login_timestamp(&self, username: &str) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let res = sqlx::query("UPDATE users SET last_login_at = ? WHERE username = ?")
            .bind(now)
            .bind(username)
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(ChatError::NotFound(format!("用户 {} 不存在", username)));
        }
        Ok(now)
    }

    // 没有用户时返回空列表，不视为错误
    pub async fn all(&self) -> Result<Vec<PublicProfile>> {
        let users = sqlx::query_as::<_, PublicProfile>(
            "SELECT username, first_name, last_name, phone FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn get(&self, username: &str) -> Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT username, first_name, last_name, phone, join_at, last_login_at
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        profile.ok_or_else(|| ChatError::NotFound(format!("用户 {} 不存在", username)))
    }

    // 该用户发出的全部消息，附接收者的公开资料
    pub async fn messages_from(&self, username: &str) -> Result<Vec<SentMessage>> {
        let rows = sqlx::query(
            "SELECT m.id, m.body, m.sent_at, m.read_at,
                    u.username, u.first_name, u.last_name, u.phone
             FROM messages m
             JOIN users u ON m.to_username = u.username
             WHERE m.from_username = ?
             ORDER BY m.id",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SentMessage {
                    id: row.try_get("id")?,
                    body: row.try_get("body")?,
                    sent_at: row.try_get("sent_at")?,
                    read_at: row.try_get("read_at")?,
                    to_user: PublicProfile {
                        username: row.try_get("username")?,
                        first_name: row.try_get("first_name")?,
                        last_name: row.try_get("last_name")?,
                        phone: row.try_get("phone")?,
                    },
                })
            })
            .collect()
    }

    // 该用户收到的全部消息，附发送者的公开资料
    pub async fn messages_to(&self, username: &str) -> Result<Vec<ReceivedMessage>> {
        let rows = sqlx::query(
            "SELECT m.id, m.body, m.sent_at, m.read_at,
                    u.username, u.first_name, u.last_name, u.phone
             FROM messages m
             JOIN users u ON m.from_username = u.username
             WHERE m.to_username = ?
             ORDER BY m.id",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ReceivedMessage {
                    id: row.try_get("id")?,
                    body: row.try_get("body")?,
                    sent_at: row.try_get("sent_at")?,
                    read_at: row.try_get("read_at")?,
                    from_user: PublicProfile {
                        username: row.try_get("username")?,
                        first_name: row.try_get("first_name")?,
                        last_name: row.try_get("last_name")?,
                        phone: row.try_get("phone")?,
                    },
                })
            })
            .collect()
    }
}

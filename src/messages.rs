// src/messages.rs
use crate::error::{ChatError, Result};
use crate::models::{Message, MessageDetail, PublicProfile};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

#[derive(Clone)]
pub struct MessageStore {
    pool: SqlitePool,
}

impl MessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, from_username: &str, to_username: &str, body: &str) -> Result<Message> {
        let now = Utc::now();
        let res = sqlx::query(
            "INSERT INTO messages (from_username, to_username, body, sent_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(from_username)
        .bind(to_username)
        .bind(body)
        .bind(now)
        .execute(&self.pool)
        .await;

        match res {
            Ok(done) => Ok(Message {
                id: done.last_insert_rowid(),
                from_username: from_username.to_string(),
                to_username: to_username.to_string(),
                body: body.to_string(),
                sent_at: now,
                read_at: None,
            }),
            // 外键失败 = 收发方之一不是注册用户
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(
                ChatError::Validation("发送者或接收者不是注册用户".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: i64) -> Result<MessageDetail> {
        let row = sqlx::query(
            "SELECT m.id, m.body, m.sent_at, m.read_at,
                    f.username AS from_username, f.first_name AS from_first_name,
                    f.last_name AS from_last_name, f.phone AS from_phone,
                    t.username AS to_username, t.first_name AS to_first_name,
                    t.last_name AS to_last_name, t.phone AS to_phone
             FROM messages m
             JOIN users f ON m.from_username = f.username
             JOIN users t ON m.to_username = t.username
             WHERE m.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(ChatError::NotFound(format!("消息 {} 不存在", id)));
        };

        Ok(MessageDetail {
            id: row.try_get("id")?,
            body: row.try_get("body")?,
            sent_at: row.try_get("sent_at")?,
            read_at: row.try_get("read_at")?,
            from_user: PublicProfile {
                username: row.try_get("from_username")?,
                first_name: row.try_get("from_first_name")?,
                last_name: row.try_get("from_last_name")?,
                phone: row.try_get("from_phone")?,
            },
            to_user: PublicProfile {
                username: row.try_get("to_username")?,
                first_name: row.try_get("to_first_name")?,
                last_name: row.try_get("to_last_name")?,
                phone: row.try_get("to_phone")?,
            },
        })
    }

    // 幂等：只在未读时写入，重复调用返回首次的时间戳
    pub async fn mark_read(&self, id: i64) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let res = sqlx::query("UPDATE messages SET read_at = ? WHERE id = ? AND read_at IS NULL")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if res.rows_affected() > 0 {
            return Ok(now);
        }

        // 没有写入：要么消息不存在，要么早已标记为已读
        let row = sqlx::query("SELECT read_at FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let read_at: Option<DateTime<Utc>> = row.try_get("read_at")?;
                Ok(read_at.unwrap_or(now))
            }
            None => Err(ChatError::NotFound(format!("消息 {} 不存在", id))),
        }
    }
}

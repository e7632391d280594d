// src/protocol.rs
use crate::models::{Message, MessageDetail, PublicProfile, ReceivedMessage, SentMessage, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "action")]
pub enum ClientRequest {
    #[serde(rename = "register")]
    Register {
        username: String,
        password: String,
        first_name: String,
        last_name: String,
        phone: String,
    },
    #[serde(rename = "login")]
    Login { username: String, password: String },
    // 用之前签发的令牌恢复会话
    #[serde(rename = "resume")]
    Resume { token: String },
    #[serde(rename = "send_message")]
    SendMessage { to: String, body: String },
    #[serde(rename = "get_message")]
    GetMessage { id: i64 },
    #[serde(rename = "mark_read")]
    MarkRead { id: i64 },
    #[serde(rename = "list_users")]
    ListUsers,
    #[serde(rename = "get_user")]
    GetUser { username: String },
    #[serde(rename = "sent_box")]
    SentBox,
    #[serde(rename = "inbox")]
    Inbox,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "action")]
pub enum ServerResponse {
    #[serde(rename = "auth_response")]
    AuthResponse { token: String, user: PublicProfile },
    #[serde(rename = "message_sent")]
    MessageSent { message: Message },
    #[serde(rename = "message_detail")]
    MessageDetail { message: MessageDetail },
    #[serde(rename = "read_receipt")]
    ReadReceipt { id: i64, read_at: DateTime<Utc> },
    #[serde(rename = "user_list")]
    UserList { users: Vec<PublicProfile> },
    #[serde(rename = "user_profile")]
    UserProfile { user: UserProfile },
    #[serde(rename = "sent_box")]
    SentBox { messages: Vec<SentMessage> },
    #[serde(rename = "inbox")]
    Inbox { messages: Vec<ReceivedMessage> },
    #[serde(rename = "error")]
    Error { message: String, status: u16 },
}

// src/client.rs
use crate::auth::AuthFlow;
use crate::error::{ChatError, Result};
use crate::messages::MessageStore;
use crate::models::{PublicProfile, RegisterFields};
use crate::protocol::{ClientRequest, ServerResponse};
use crate::users::UserStore;
use crate::utils::{read_packet, write_packet};
use tokio::io::{BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::info;

pub struct Client {
    auth: AuthFlow,
    users: UserStore,
    messages: MessageStore,
    // 登录成功后保存会话对应的用户名
    username: Option<String>,
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl Client {
    pub fn new(socket: TcpStream, auth: AuthFlow, users: UserStore, messages: MessageStore) -> Self {
        let (reader, writer) = socket.into_split();
        Self {
            auth,
            users,
            messages,
            username: None,
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let request: ClientRequest = match read_packet(&mut self.reader).await {
                Ok(req) => req,
                Err(_) => {
                    // 连接关闭
                    if let Some(ref username) = self.username {
                        info!("用户 {} 已断开连接", username);
                    }
                    break;
                }
            };

            let response = match self.handle(request).await {
                Ok(resp) => resp,
                Err(err) => ServerResponse::Error {
                    status: err.status_hint(),
                    message: err.to_string(),
                },
            };

            write_packet(&mut self.writer, &response).await?;
        }
        Ok(())
    }

    async fn handle(&mut self, request: ClientRequest) -> Result<ServerResponse> {
        match request {
            // 已登录后再次尝试注册或登录
            ClientRequest::Register { .. } | ClientRequest::Login { .. } | ClientRequest::Resume { .. }
                if self.username.is_some() =>
            {
                Err(ChatError::Validation("您已登录".to_string()))
            }
            ClientRequest::Register {
                username,
                password,
                first_name,
                last_name,
                phone,
            } => {
                let fields = RegisterFields {
                    username,
                    password,
                    first_name,
                    last_name,
                    phone,
                };
                let (token, user) = self.auth.register(&fields).await?;
                info!("用户 {} 注册成功", user.username);
                self.username = Some(user.username.clone());
                Ok(ServerResponse::AuthResponse { token, user })
            }
            ClientRequest::Login { username, password } => {
                let token = self.auth.login(&username, &password).await?;
                let profile = self.users.get(&username).await?;
                info!("用户 {} 登录成功", username);
                self.username = Some(username);
                Ok(ServerResponse::AuthResponse {
                    token,
                    user: PublicProfile {
                        username: profile.username,
                        first_name: profile.first_name,
                        last_name: profile.last_name,
                        phone: profile.phone,
                    },
                })
            }
            ClientRequest::Resume { token } => {
                let username = self.auth.verify_token(&token)?;
                // 确认令牌指向的用户仍然存在
                let profile = self.users.get(&username).await?;
                info!("用户 {} 通过令牌恢复会话", username);
                self.username = Some(username);
                Ok(ServerResponse::AuthResponse {
                    token,
                    user: PublicProfile {
                        username: profile.username,
                        first_name: profile.first_name,
                        last_name: profile.last_name,
                        phone: profile.phone,
                    },
                })
            }
            other => {
                let Some(username) = self.username.clone() else {
                    return Err(ChatError::Auth("请先登录".to_string()));
                };
                self.handle_signed_in(&username, other).await
            }
        }
    }

    async fn handle_signed_in(&mut self, username: &str, request: ClientRequest) -> Result<ServerResponse> {
        match request {
            ClientRequest::SendMessage { to, body } => {
                let message = self.messages.create(username, &to, &body).await?;
                Ok(ServerResponse::MessageSent { message })
            }
            ClientRequest::GetMessage { id } => {
                let message = self.messages.get(id).await?;
                // 只有发送者或接收者可以查看
                if message.from_user.username != username && message.to_user.username != username {
                    return Err(ChatError::Auth("无权查看该消息".to_string()));
                }
                Ok(ServerResponse::MessageDetail { message })
            }
            ClientRequest::MarkRead { id } => {
                let message = self.messages.get(id).await?;
                // 只有接收者可以标记已读
                if message.to_user.username != username {
                    return Err(ChatError::Auth("只有接收者可以标记已读".to_string()));
                }
                let read_at = self.messages.mark_read(id).await?;
                Ok(ServerResponse::ReadReceipt { id, read_at })
            }
            ClientRequest::ListUsers => Ok(ServerResponse::UserList {
                users: self.users.all().await?,
            }),
            ClientRequest::GetUser { username: target } => Ok(ServerResponse::UserProfile {
                user: self.users.get(&target).await?,
            }),
            ClientRequest::SentBox => Ok(ServerResponse::SentBox {
                messages: self.users.messages_from(username).await?,
            }),
            ClientRequest::Inbox => Ok(ServerResponse::Inbox {
                messages: self.users.messages_to(username).await?,
            }),
            ClientRequest::Register { .. } | ClientRequest::Login { .. } | ClientRequest::Resume { .. } => {
                Err(ChatError::Validation("您已登录".to_string()))
            }
        }
    }
}

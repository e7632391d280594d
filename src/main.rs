// src/main.rs
use anyhow::Result;
use mchat_server::auth::{AuthFlow, TokenIssuer};
use mchat_server::client::Client;
use mchat_server::config::Config;
use mchat_server::db::init_db_pool;
use mchat_server::messages::MessageStore;
use mchat_server::users::UserStore;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // 初始化数据库连接池和表结构
    let pool = init_db_pool(&config).await?;

    let users = UserStore::new(pool.clone(), config.bcrypt_cost);
    let messages = MessageStore::new(pool.clone());
    let auth = AuthFlow::new(users.clone(), TokenIssuer::new(&config.secret_key));

    // 启动TCP服务器
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("服务器已启动，监听 {}", config.bind_addr);

    loop {
        let (socket, addr) = listener.accept().await?;
        info!("新连接来自: {}", addr);

        let mut client = Client::new(socket, auth.clone(), users.clone(), messages.clone());
        tokio::spawn(async move {
            if let Err(e) = client.run().await {
                error!("处理客户端时出错: {:?}", e);
            }
        });
    }
}

// tests/common/mod.rs
use mchat_server::config::Config;
use mchat_server::db::init_db_pool;
use mchat_server::models::RegisterFields;
use sqlx::SqlitePool;

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        secret_key: "test-secret".to_string(),
        // 测试用最低代价，避免拖慢用例
        bcrypt_cost: 4,
        // 内存库必须单连接，多个连接各自是独立的库
        db_max_connections: 1,
    }
}

pub async fn test_pool() -> SqlitePool {
    init_db_pool(&test_config()).await.expect("初始化测试数据库失败")
}

pub fn register_fields(username: &str) -> RegisterFields {
    RegisterFields {
        username: username.to_string(),
        password: "secret123".to_string(),
        first_name: "三".to_string(),
        last_name: "张".to_string(),
        phone: "13800000000".to_string(),
    }
}

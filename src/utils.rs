// src/utils.rs
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

// 长度前缀 (u32 大端) + JSON 的包格式，请求响应共用

// 单包上限，长度超过即视为损坏或恶意的流，不做分配
pub const MAX_PACKET_LEN: usize = 1024 * 1024;

pub async fn write_packet<W, T>(writer: &mut W, msg: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let json = serde_json::to_vec(msg)?;
    writer.write_all(&(json.len() as u32).to_be_bytes()).await?;
    writer.write_all(&json).await?;
    // 确保刷新缓冲区
    writer.flush().await?;
    Ok(())
}

pub async fn read_packet<R, T>(reader: &mut R) -> Result<T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut length_buf = [0u8; 4];
    reader.read_exact(&mut length_buf).await?;
    let length = u32::from_be_bytes(length_buf) as usize;
    if length > MAX_PACKET_LEN {
        anyhow::bail!("数据包过大: {} 字节", length);
    }

    let mut json_buf = vec![0u8; length];
    reader.read_exact(&mut json_buf).await?;

    Ok(serde_json::from_slice(&json_buf)?)
}

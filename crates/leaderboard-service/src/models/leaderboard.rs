//! 排行榜实体与 ID 生成

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 生成的 ID 长度
pub const ID_LENGTH: usize = 26;

/// ID 编码字母表（base32 变体，去掉了易混淆字符）
const ID_ALPHABET: &[u8; 32] = b"ybndrfg8ejkmcpqxot1uwisza345h769";

/// 生成全局唯一 ID
///
/// 随机 UUID v4 的 16 字节按 5 位一组编码为 26 个字符，不含填充
pub fn new_id() -> String {
    encode_id(Uuid::new_v4().as_bytes())
}

fn encode_id(bytes: &[u8; 16]) -> String {
    let mut out = String::with_capacity(ID_LENGTH);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ID_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(ID_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    out
}

/// 检查字符串是否为合法的生成 ID
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LENGTH && id.bytes().all(|b| ID_ALPHABET.contains(&b))
}

/// 排行榜
///
/// 每个运行实例只有一条，启动时按名称查找或创建，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Leaderboard {
    pub id: String,
    pub name: String,
}

impl Leaderboard {
    /// 创建尚未持久化的排行榜（ID 为空）
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
        }
    }

    /// 保存前补全 ID
    pub fn pre_save(&mut self) {
        if self.id.is_empty() {
            self.id = new_id();
        }
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}

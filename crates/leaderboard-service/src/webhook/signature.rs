//! Webhook 签名校验（HMAC-SHA1）
//!
//! 代码托管平台用共享密钥对请求体计算 HMAC-SHA1，放在 `X-Hub-Signature`
//! 头中，格式为 `sha1=<小写十六进制>`。签名校验是处理流程的第一步，
//! 校验失败时不得解析负载，也不得访问存储。

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// 签名所在的请求头
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

const SIGNATURE_PREFIX: &str = "sha1=";

/// 解析签名头，返回原始签名字节
///
/// 只接受 `sha1=` 前缀加小写十六进制，其余格式一律返回 `None`。
/// 只接受小写是为了与平台生成的字符串逐字节一致。
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix(SIGNATURE_PREFIX)?;

    if hex_sig.bytes().any(|b| b.is_ascii_uppercase()) {
        return None;
    }

    hex::decode(hex_sig).ok()
}

/// 计算请求体的 HMAC-SHA1
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    // HMAC 接受任意长度的密钥，new_from_slice 不会失败
    let Ok(mut mac) = HmacSha1::new_from_slice(secret) else {
        return Vec::new();
    };
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// 格式化为签名头的值：`sha1=<hex>`
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{SIGNATURE_PREFIX}{}", hex::encode(signature))
}

/// 便捷函数：直接计算请求体对应的签名头
pub fn sign_payload(payload: &[u8], secret: &[u8]) -> String {
    format_signature_header(&compute_signature(payload, secret))
}

/// 校验签名
///
/// 当且仅当 `signature_header == "sha1=" + hex(HMAC-SHA1(payload, secret))`
/// 时返回 `true`。缺失或格式错误的签名只是校验失败，不会 panic。
/// 比较通过 HMAC 库完成，耗时与签名内容无关。
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let Some(expected) = parse_signature_header(signature_header) else {
        return false;
    };

    let Ok(mut mac) = HmacSha1::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);

    mac.verify_slice(&expected).is_ok()
}

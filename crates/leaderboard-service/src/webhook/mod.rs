//! Webhook 接入
//!
//! 目前只包含签名校验，负载解析见 [`crate::models::WebhookEvent`]。

mod signature;

pub use signature::{
    SIGNATURE_HEADER, compute_signature, format_signature_header, parse_signature_header,
    sign_payload, verify_signature,
};

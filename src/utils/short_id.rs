//! 短 ID 生成
//!
//! 短 ID 由目标 URL 的 UUIDv5（SHA-1，URL 命名空间）派生：
//! 同一个 URL 永远得到同一个 ID，重复创建因此是幂等的。

use uuid::Uuid;

/// 哈希可提供的最大长度（32 位十六进制字符）
pub const MAX_ID_LENGTH: usize = 32;

/// 返回 URL 的完整十六进制摘要（小写，无连字符）
pub fn url_digest_hex(url: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes())
        .simple()
        .to_string()
}

/// 生成指定长度的短 ID
///
/// 长度会被限制在 `1..=MAX_ID_LENGTH` 内。不同 URL 截断后可能冲突，
/// 冲突的处理交给调用方（见 `ShortieService::create`）。
pub fn generate_short_id(url: &str, length: usize) -> String {
    let length = length.clamp(1, MAX_ID_LENGTH);
    let mut digest = url_digest_hex(url);
    digest.truncate(length);
    digest
}

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indicatif::ProgressStyle;

/// 将图片内容编码为 base64 文本
pub fn encode_image(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// 解码 base64 图片
pub fn decode_image(image: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(image)
}

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
    )
    .expect("invalid progress template")
    .progress_chars("##-")
}

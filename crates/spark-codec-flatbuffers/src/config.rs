//! 映射器配置：内容类型、分帧方式与消息大小预算。

use serde::Deserialize;

use crate::error::CodecError;
use crate::metadata::{ContentType, FLATBUFFERS_CONTENT_TYPE};

/// 读取时如何从游标中界定一条消息。
///
/// # 教案式说明
/// - **意图 (Why)**：FlatBuffers 缓冲本身不携带总长度，映射器无法可靠地“探测”是否存在长度前缀；
///   因此分帧方式必须由部署方显式声明，而不是靠猜；
/// - **契约 (What)**：
///   - `WholeBuffer`（缺省）：游标剩余的全部字节即一条消息；
///   - `SizePrefixed`：仅在传输层保证每条消息以 4 字节小端长度开头时启用，一次读取只消费一条消息，
///     写出时同样追加前缀。
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// 剩余字节即一条消息。
    #[default]
    WholeBuffer,
    /// 每条消息以 4 字节小端长度开头。
    SizePrefixed,
}

/// `MapperConfig` 描述 [`crate::FlatBuffersMapper`] 的可调参数。
///
/// # 逻辑解析（How）
/// - 可由 TOML 片段反序列化（[`MapperConfig::from_toml_str`]），缺失字段取缺省值，未知字段报错；
/// - 也可在代码中以 `with_*` 链式构造。
///
/// ```
/// use spark_codec_flatbuffers::{Framing, MapperConfig};
///
/// let config = MapperConfig::from_toml_str(
///     r#"
///     framing = "size_prefixed"
///     max_message_size = 65536
///     "#,
/// )
/// .expect("valid config");
/// assert_eq!(config.framing, Framing::SizePrefixed);
/// assert_eq!(config.content_type, "application/x-flatbuffers");
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MapperConfig {
    /// 映射器声明的媒体类型。
    pub content_type: String,
    /// 分帧方式。
    pub framing: Framing,
    /// 单条消息的最大字节数，`None` 表示不限制。
    pub max_message_size: Option<usize>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            content_type: FLATBUFFERS_CONTENT_TYPE.to_owned(),
            framing: Framing::WholeBuffer,
            max_message_size: None,
        }
    }
}

impl MapperConfig {
    /// 从 TOML 文本解析。
    pub fn from_toml_str(raw: &str) -> Result<Self, CodecError> {
        toml::from_str(raw).map_err(|error| CodecError::Config {
            detail: error.to_string(),
        })
    }

    /// 设置媒体类型。
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// 设置分帧方式。
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// 设置消息大小预算。
    pub fn with_max_message_size(mut self, limit: usize) -> Self {
        self.max_message_size = Some(limit);
        self
    }

    /// 媒体类型的强类型表示。
    pub fn content_type(&self) -> ContentType {
        ContentType::new(self.content_type.clone())
    }

    /// 检查消息是否超出预算。
    pub(crate) fn check_size(&self, size: usize) -> Result<(), CodecError> {
        match self.max_message_size {
            Some(limit) if size > limit => Err(CodecError::MessageTooLarge { size, limit }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = MapperConfig::from_toml_str("").expect("empty toml");
        assert_eq!(config, MapperConfig::default());
        assert_eq!(config.content_type().as_str(), "application/x-flatbuffers");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error =
            MapperConfig::from_toml_str("legacy_size_prefix = true").expect_err("unknown field");
        assert_eq!(error.code(), crate::codes::CONFIG_INVALID);
    }

    #[test]
    fn unknown_framing_is_rejected() {
        assert!(MapperConfig::from_toml_str(r#"framing = "guess""#).is_err());
    }

    #[test]
    fn builder_overrides_fields() {
        let config = MapperConfig::default()
            .with_content_type("application/vnd.spark.monster")
            .with_framing(Framing::SizePrefixed)
            .with_max_message_size(16);
        assert_eq!(config.content_type, "application/vnd.spark.monster");
        assert!(config.check_size(16).is_ok());
        assert!(matches!(
            config.check_size(17),
            Err(CodecError::MessageTooLarge { size: 17, limit: 16 })
        ));
    }
}

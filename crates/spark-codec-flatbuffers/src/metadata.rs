//! 映射器对外声明的内容类型与 schema 元信息。

use std::borrow::Cow;

/// FlatBuffers 载荷的缺省媒体类型。
pub const FLATBUFFERS_CONTENT_TYPE: &str = "application/x-flatbuffers";

/// `ContentType` 以 IANA `media-type` 约定描述消息的主语义。
///
/// # 设计背景（Why）
/// - 管线在协商阶段以媒体类型挑选映射器，FlatBuffers 尚无注册的标准类型，社区惯例为 `application/x-flatbuffers`；
/// - 通过 `Cow<'static, str>` 兼容静态常量与运行时配置给出的类型，避免过度复制。
///
/// # 契约说明（What）
/// - **前置条件**：传入的媒体类型应满足 `type/subtype` 格式，推荐全小写；
/// - **后置条件**：实例内部存储为 `'static`，可长期缓存在映射器中。
///
/// # 风险提示（Trade-offs）
/// - 不校验格式合法性；来自外部配置的值需由调用方把关。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentType(Cow<'static, str>);

impl ContentType {
    /// 创建新的内容类型。
    pub fn new(value: impl Into<Cow<'static, str>>) -> Self {
        Self(value.into())
    }

    /// FlatBuffers 缺省内容类型。
    pub fn flatbuffers() -> Self {
        Self(Cow::Borrowed(FLATBUFFERS_CONTENT_TYPE))
    }

    /// 返回底层字符串表示。
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::flatbuffers()
    }
}

/// `SchemaDescriptor` 命名一条消息所属的 schema 表。
///
/// `name` 即 FlatBuffers schema 中的 `namespace.Table`，与 [`crate::TypeToken::name`] 一致。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaDescriptor {
    name: Cow<'static, str>,
}

impl SchemaDescriptor {
    /// 以全限定名构造。
    pub fn with_name(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    /// schema 全限定名。
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// `CodecDescriptor` 是映射器对外的识别信息：内容类型，以及在令牌已知时所针对的 schema。
///
/// # 契约说明（What）
/// - [`crate::ObjectMapper::descriptor`] 返回的描述符不带 schema，表示映射器可处理任意已注册类型；
/// - [`crate::FlatBuffersMapper::descriptor_for`] 针对某个表令牌附上 schema，原始缓冲令牌不附加；
/// - 载荷不经任何内容层变换，因此描述符不携带编码字段。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecDescriptor {
    content_type: ContentType,
    schema: Option<SchemaDescriptor>,
}

impl CodecDescriptor {
    /// 仅含内容类型的描述符。
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            schema: None,
        }
    }

    /// 附上 schema。
    pub fn with_schema(mut self, schema: SchemaDescriptor) -> Self {
        self.schema = Some(schema);
        self
    }

    /// 内容类型。
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// 针对的 schema；通用描述符为 `None`。
    pub fn schema(&self) -> Option<&SchemaDescriptor> {
        self.schema.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_content_type_is_flatbuffers() {
        assert_eq!(ContentType::default().as_str(), "application/x-flatbuffers");
        assert_eq!(
            ContentType::new(String::from("application/vnd.spark")).as_str(),
            "application/vnd.spark"
        );
    }

    #[test]
    fn schema_is_absent_until_attached() {
        let generic = CodecDescriptor::new(ContentType::flatbuffers());
        assert!(generic.schema().is_none());
        let targeted = generic.with_schema(SchemaDescriptor::with_name("MyGame.Sample.Monster"));
        assert_eq!(
            targeted.schema().map(SchemaDescriptor::name),
            Some("MyGame.Sample.Monster")
        );
    }
}

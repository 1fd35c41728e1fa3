//! FlatBuffers 对象映射器：管线值与字节流之间的读写适配。

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{trace, warn};

use crate::config::MapperConfig;
use crate::error::{CodecError, ErrorStack};
use crate::frame::{frame_payload, locate_message};
use crate::metadata::CodecDescriptor;
use crate::registry::TypeRegistry;
use crate::stream::{InputCursor, OutputSink};
use crate::token::{TypeKind, TypeToken};
use crate::value::Value;

/// 根偏移占用的最小字节数。
const MIN_MESSAGE_SIZE: usize = 4;

/// `ObjectMapper` 是数据交换管线调用的序列化插件契约。
///
/// # 设计背景（Why）
/// - 管线同时挂载多种格式的映射器，按内容类型选择其一，因此接口必须对象安全；
/// - 读写失败不打断管线：错误被压入调用方提供的 [`ErrorStack`]，返回值退化为空结果。
///
/// # 契约说明（What）
/// - `write`：成功时恰好写出值的全部字节，失败时压入一条错误且可能已写出部分字节（短写）；
/// - `read`：成功时返回非空值并推进游标；失败时压入一条错误并返回 [`Value::Null`]；
/// - 实现必须是无状态或内部同步的，可被多线程并发调用。
pub trait ObjectMapper: Send + Sync {
    /// 映射器的内容类型与编码描述。
    fn descriptor(&self) -> &CodecDescriptor;

    /// 把 `value` 写入 `sink`。
    fn write(&self, sink: &mut dyn OutputSink, value: &Value, errors: &mut ErrorStack);

    /// 按 `token` 从 `cursor` 读取一个值。
    fn read(
        &self,
        cursor: &mut dyn InputCursor,
        token: Option<&TypeToken>,
        errors: &mut ErrorStack,
    ) -> Value;
}

/// 以 FlatBuffers 表格式收发消息的 [`ObjectMapper`]。
///
/// # 行为概览（How）
/// - 写入：值为类型化视图时写出其完整缓冲；值为非空原始字节时原样写出；
/// - 读取：按分帧方式界定一条消息，复制为独立缓冲后推进游标，再按令牌查注册表构造视图；
///   令牌为原始字节类型时直接返回字节；
/// - 缺省使用进程级 [`TypeRegistry::global`]，也可通过 [`FlatBuffersMapper::with_registry`] 注入隔离实例。
///
/// # 契约说明（What）
/// - 读取不做 schema 校验，消息内容的合法性由调用方按需经 [`crate::TypedView::check_bounds`] 确认；
/// - 读取得到的视图拥有独立缓冲，游标背后的存储随后被复用或释放都不影响视图；
/// - 游标在查表**之前**推进，因此“类型未注册”失败同样会消费这条消息。
///
/// # 权衡与风险（Trade-offs）
/// - 读取总是复制一次字节，换取视图与入站缓冲生命周期解耦；
/// - 整缓冲分帧下一次读取消费全部剩余字节，同一游标上的多条消息需要改用长度前缀分帧。
pub struct FlatBuffersMapper {
    config: MapperConfig,
    descriptor: CodecDescriptor,
    registry: Option<Arc<TypeRegistry>>,
}

impl FlatBuffersMapper {
    /// 以缺省配置构造，使用全局注册表。
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    /// 以给定配置构造，使用全局注册表。
    pub fn with_config(config: MapperConfig) -> Self {
        let descriptor = CodecDescriptor::new(config.content_type());
        Self {
            config,
            descriptor,
            registry: None,
        }
    }

    /// 改用隔离的注册表。
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 当前配置。
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// 针对某个令牌的描述符：表令牌附上其 schema 名称，原始缓冲令牌保持通用描述。
    pub fn descriptor_for(&self, token: &TypeToken) -> CodecDescriptor {
        match token.kind() {
            TypeKind::Table => self
                .descriptor
                .clone()
                .with_schema(token.schema_descriptor()),
            TypeKind::RawBuffer => self.descriptor.clone(),
        }
    }

    /// 读取路径使用的注册表。
    pub fn registry(&self) -> &TypeRegistry {
        match &self.registry {
            Some(registry) => registry,
            None => TypeRegistry::global(),
        }
    }

    /// 写入 `value`，以 `Result` 报告失败。
    pub fn try_write(&self, sink: &mut dyn OutputSink, value: &Value) -> Result<(), CodecError> {
        // === 教案级注释 ===
        // Why: 管线交来的值可能为空、可能是空视图、也可能是无法解释的形态，三者需要不同的错误码。
        // How:
        // 1. 按值形态取出载荷字节，空值、空视图、空原始字节分别拒绝；
        // 2. 校验大小预算，再按分帧方式组装待写字节；
        // 3. 对输出槽只做一次写入尝试，实际写入量不足即报告短写。
        // What: 成功时 `sink` 恰好接受了整条消息。
        let payload = match value {
            Value::Null => return Err(CodecError::EmptyValue),
            Value::View(view) => {
                let bytes = view.buffer_bytes();
                if bytes.is_empty() {
                    return Err(CodecError::EmptyBuffer);
                }
                bytes
            }
            Value::Raw(bytes) if !bytes.is_empty() => &bytes[..],
            Value::Raw(_) => return Err(CodecError::UnsupportedValue),
        };

        self.config.check_size(payload.len())?;
        let framed = frame_payload(payload, self.config.framing)?;
        let expected = framed.len();
        let written = sink.write_simple(&framed)?;
        if written != expected {
            warn!(expected, written, "flatbuffers sink accepted fewer bytes than the message");
            return Err(CodecError::ShortWrite { expected, written });
        }
        trace!(size = expected, "wrote flatbuffers message");
        Ok(())
    }

    /// 读取一个值，以 `Result` 报告失败。
    pub fn try_read(
        &self,
        cursor: &mut dyn InputCursor,
        token: Option<&TypeToken>,
    ) -> Result<Value, CodecError> {
        // === 教案级注释 ===
        // Why: 调用方需要区分“没说要什么类型”“没有数据”“数据不够开始解析”“类型未注册”四种失败。
        // How:
        // 1. 先确认令牌存在，再检查剩余字节：0 字节为无数据，不足 4 字节为缓冲过小；
        // 2. 按分帧方式界定消息并校验预算，把消息复制为独立缓冲；
        // 3. 推进游标，之后才按令牌解释字节。
        // What: 返回的值不借用游标背后的存储。
        let token = token.ok_or(CodecError::MissingType)?;

        let remaining = cursor.remaining_data();
        if remaining.is_empty() {
            return Err(CodecError::NoData);
        }
        if remaining.len() < MIN_MESSAGE_SIZE {
            return Err(CodecError::BufferTooSmall {
                available: remaining.len(),
            });
        }

        let range = locate_message(remaining, self.config.framing)?;
        self.config.check_size(range.len())?;
        let consumed = range.end;
        let bytes = Bytes::copy_from_slice(&remaining[range]);
        let position = cursor.position();
        cursor.set_position(position + consumed);
        trace!(type_name = token.name(), size = bytes.len(), "read flatbuffers message");

        if token.is_raw_buffer() {
            return Ok(Value::Raw(bytes));
        }
        match self.registry().lookup(token) {
            Some(factory) => Ok(factory(bytes)),
            None => {
                warn!(type_name = token.name(), "no flatbuffers view factory registered");
                Err(CodecError::NoFactory { token: *token })
            }
        }
    }
}

impl Default for FlatBuffersMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FlatBuffersMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatBuffersMapper")
            .field("config", &self.config)
            .field("isolated_registry", &self.registry.is_some())
            .finish()
    }
}

impl ObjectMapper for FlatBuffersMapper {
    fn descriptor(&self) -> &CodecDescriptor {
        &self.descriptor
    }

    fn write(&self, sink: &mut dyn OutputSink, value: &Value, errors: &mut ErrorStack) {
        if let Err(error) = self.try_write(sink, value) {
            errors.push(error);
        }
    }

    fn read(
        &self,
        cursor: &mut dyn InputCursor,
        token: Option<&TypeToken>,
        errors: &mut ErrorStack,
    ) -> Value {
        match self.try_read(cursor, token) {
            Ok(value) => value,
            Err(error) => {
                errors.push(error);
                Value::Null
            }
        }
    }
}

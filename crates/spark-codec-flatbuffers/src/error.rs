//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义映射器读写路径的全部失败语义，任何一种都不应导致进程崩溃；
//! - 读写接口把错误压入 [`ErrorStack`] 而不是立即返回，调用方可以在若干次耦合操作之后统一检查。
//!
//! ## 设计要求（What）
//! - 每个变体对应一个稳定错误码（见 [`codes`]），遵循 `<领域>.<语义>` 命名约定，便于日志检索与聚合；
//! - “调用方未指定类型”“无数据可读”“数据不足以开始解析”“请求类型未注册”四类读取失败必须可区分。

use std::io;
use std::vec::Drain;

use thiserror::Error;

use crate::token::TypeToken;

/// 映射器错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：为写入、读取、配置三条路径提供细粒度变体，支撑精确的告警与排障；
/// - **契约 (What)**：
///   - 所有变体均满足 `Send + Sync + 'static`，可安全跨线程传播；
///   - [`CodecError::code`] 返回稳定错误码，不随文案调整而变化；
/// - **权衡 (Trade-offs)**：`Io` 变体保留原始 [`io::Error`]，因此枚举不实现 `Clone`/`PartialEq`，
///   测试中请使用 `matches!` 或比较错误码。
#[derive(Debug, Error)]
pub enum CodecError {
    /// 写入的值为空。
    #[error("value is null")]
    EmptyValue,

    /// 视图存在但其缓冲没有任何字节。
    #[error("flatbuffers view has an empty buffer")]
    EmptyBuffer,

    /// 值既不是类型化视图，也不是非空原始字节。
    #[error("unsupported value for flatbuffers serialization")]
    UnsupportedValue,

    /// 输出槽接受的字节少于载荷长度。
    #[error("short write: expected {expected} bytes, sink accepted {written}")]
    ShortWrite {
        /// 期望写入的字节数。
        expected: usize,
        /// 输出槽实际接受的字节数。
        written: usize,
    },

    /// 读取时调用方未提供目标类型。
    #[error("target type is missing")]
    MissingType,

    /// 游标没有剩余数据。
    #[error("no data available")]
    NoData,

    /// 剩余数据不足 4 字节，无法容纳根偏移。
    #[error("buffer too small: {available} bytes available, at least 4 required")]
    BufferTooSmall {
        /// 游标剩余字节数。
        available: usize,
    },

    /// 请求的表类型没有注册视图工厂。
    #[error("no factory registered for `{}`", token.name())]
    NoFactory {
        /// 请求的类型令牌。
        token: TypeToken,
    },

    /// 长度前缀声明的消息超出游标剩余字节。
    #[error("incomplete frame: prefix declares {declared} bytes, only {available} available")]
    IncompleteFrame {
        /// 前缀声明的消息长度。
        declared: usize,
        /// 前缀之后实际剩余的字节数。
        available: usize,
    },

    /// 消息超过配置的大小预算。
    #[error("message of {size} bytes exceeds the {limit}-byte budget")]
    MessageTooLarge {
        /// 消息长度。
        size: usize,
        /// 配置的上限。
        limit: usize,
    },

    /// 输出槽返回 I/O 错误。
    #[error("sink i/o failure: {0}")]
    Io(#[from] io::Error),

    /// 配置解析失败。
    #[error("invalid mapper configuration: {detail}")]
    Config {
        /// 解析器给出的说明。
        detail: String,
    },
}

impl CodecError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::EmptyValue => codes::WRITE_EMPTY_VALUE,
            CodecError::EmptyBuffer => codes::WRITE_EMPTY_BUFFER,
            CodecError::UnsupportedValue => codes::WRITE_UNSUPPORTED_VALUE,
            CodecError::ShortWrite { .. } => codes::WRITE_SHORT_WRITE,
            CodecError::MissingType => codes::READ_MISSING_TYPE,
            CodecError::NoData => codes::READ_NO_DATA,
            CodecError::BufferTooSmall { .. } => codes::READ_BUFFER_TOO_SMALL,
            CodecError::NoFactory { .. } => codes::READ_NO_FACTORY,
            CodecError::IncompleteFrame { .. } => codes::READ_INCOMPLETE_FRAME,
            CodecError::MessageTooLarge { .. } => codes::PROTOCOL_BUDGET_EXCEEDED,
            CodecError::Io(_) => codes::TRANSPORT_IO,
            CodecError::Config { .. } => codes::CONFIG_INVALID,
        }
    }

    /// 是否属于写入路径。
    pub fn is_write_side(&self) -> bool {
        matches!(
            self,
            CodecError::EmptyValue
                | CodecError::EmptyBuffer
                | CodecError::UnsupportedValue
                | CodecError::ShortWrite { .. }
                | CodecError::Io(_)
        )
    }
}

/// 映射器使用的稳定错误码。
pub mod codes {
    /// 写入值为空。
    pub const WRITE_EMPTY_VALUE: &str = "flatbuffers.write.empty_value";
    /// 视图缓冲为空。
    pub const WRITE_EMPTY_BUFFER: &str = "flatbuffers.write.empty_buffer";
    /// 不支持的值形态。
    pub const WRITE_UNSUPPORTED_VALUE: &str = "flatbuffers.write.unsupported_value";
    /// 输出槽短写。
    pub const WRITE_SHORT_WRITE: &str = "flatbuffers.write.short_write";
    /// 读取未指定目标类型。
    pub const READ_MISSING_TYPE: &str = "flatbuffers.read.missing_type";
    /// 无数据可读。
    pub const READ_NO_DATA: &str = "flatbuffers.read.no_data";
    /// 数据不足以容纳根偏移。
    pub const READ_BUFFER_TOO_SMALL: &str = "flatbuffers.read.buffer_too_small";
    /// 请求类型未注册工厂。
    pub const READ_NO_FACTORY: &str = "flatbuffers.read.no_factory";
    /// 长度前缀声明超出剩余数据。
    pub const READ_INCOMPLETE_FRAME: &str = "flatbuffers.read.incomplete_frame";
    /// 消息超过大小预算。
    pub const PROTOCOL_BUDGET_EXCEEDED: &str = "protocol.budget_exceeded";
    /// 传输层 I/O 错误。
    pub const TRANSPORT_IO: &str = "transport.io";
    /// 配置不合法。
    pub const CONFIG_INVALID: &str = "config.invalid";
}

/// `ErrorStack` 累积一次或多次映射操作产生的错误。
///
/// # 教案式说明
/// - **意图 (Why)**：调用方经常连续执行多次读写，再统一决定如何响应；逐次返回 `Result` 会迫使其在中途分支；
/// - **契约 (What)**：
///   - 映射器在压入错误的同时总会返回空结果（`()` 或 [`crate::Value::Null`]），二者成对出现；
///   - 错误按发生顺序保存，[`ErrorStack::last`] 为最近一次；
/// - **权衡 (Trade-offs)**：栈不去重也不限长，长生命周期调用方应定期 [`ErrorStack::drain`]。
#[derive(Debug, Default)]
pub struct ErrorStack {
    errors: Vec<CodecError>,
}

impl ErrorStack {
    /// 创建空的错误栈。
    pub fn new() -> Self {
        Self::default()
    }

    /// 压入一个错误。
    pub fn push(&mut self, error: CodecError) {
        self.errors.push(error);
    }

    /// 按发生顺序遍历。
    pub fn iter(&self) -> impl Iterator<Item = &CodecError> {
        self.errors.iter()
    }

    /// 错误数量。
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// 是否没有任何错误。
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// 最近一次错误。
    pub fn last(&self) -> Option<&CodecError> {
        self.errors.last()
    }

    /// 取出全部错误并清空。
    pub fn drain(&mut self) -> Drain<'_, CodecError> {
        self.errors.drain(..)
    }

    /// 没有错误时返回 `Ok(value)`，否则返回第一个错误。
    pub fn into_result<T>(self, value: T) -> Result<T, CodecError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(value),
        }
    }
}

impl Extend<CodecError> for ErrorStack {
    fn extend<I: IntoIterator<Item = CodecError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl IntoIterator for ErrorStack {
    type Item = CodecError;
    type IntoIter = std::vec::IntoIter<CodecError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

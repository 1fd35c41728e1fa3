#![warn(missing_docs)]

//! `spark-codec-flatbuffers` 让通用的数据交换管线以 FlatBuffers 表格式收发消息，
//! 而无需在编译期知晓每一种 schema 类型。
//!
//! # 教案背景（Why）
//! - 管线只认识“字节流”与“某个值”，FlatBuffers 的零拷贝根视图却是强类型的；
//!   本 crate 在两者之间提供适配：写入侧抽取任意视图的底层字节，读取侧按类型令牌动态构造视图；
//! - 视图与其缓冲的生命周期耦合通过所有权表达：[`TypedView`] 持有 [`BufferHandle`]，
//!   根访问器总是从 `&self` 借出，不可能比缓冲活得更久。
//!
//! # 模块划分（How）
//! - [`buffer`]：缓冲句柄，区分共享只读与独占可写两种存储；
//! - [`view`]：类型化视图与对象安全的 [`AnyBufferView`]；
//! - [`token`]/[`registry`]：类型令牌与“令牌 → 视图工厂”注册表；
//! - [`value`]：管线使用的通用值容器；
//! - [`stream`]：输出槽与输入游标协作契约；
//! - [`mapper`]：[`FlatBuffersMapper`]，实现 [`ObjectMapper`] 的读写算法；
//! - [`config`]/[`metadata`]：映射器配置与内容类型描述；
//! - [`error`]：错误域、稳定错误码与累积式 [`ErrorStack`]。
//!
//! # 快速上手（What）
//! ```
//! use spark_codec_flatbuffers::{
//!     ByteCursor, ErrorStack, FlatBuffersMapper, ObjectMapper, TypeToken, Value,
//! };
//!
//! let mapper = FlatBuffersMapper::new();
//! let mut sink: Vec<u8> = Vec::new();
//! let mut errors = ErrorStack::new();
//! let payload = b"\x04\0\0\0abcd".to_vec();
//! mapper.write(&mut sink, &Value::from(payload.clone()), &mut errors);
//! assert!(errors.is_empty());
//!
//! let mut cursor = ByteCursor::new(sink);
//! let value = mapper.read(&mut cursor, Some(&TypeToken::raw_buffer()), &mut errors);
//! assert_eq!(value.payload_bytes(), Some(payload.as_slice()));
//! ```

pub mod buffer;
pub mod config;
pub mod error;
mod frame;
pub mod mapper;
pub mod metadata;
pub mod registry;
mod sealed;
pub mod stream;
pub mod token;
pub mod value;
pub mod view;

pub use crate::buffer::BufferHandle;
pub use crate::config::{Framing, MapperConfig};
pub use crate::error::{CodecError, ErrorStack, codes};
pub use crate::mapper::{FlatBuffersMapper, ObjectMapper};
pub use crate::metadata::{CodecDescriptor, ContentType, SchemaDescriptor};
pub use crate::registry::{TypeRegistry, ViewFactory};
pub use crate::stream::{ByteCursor, InputCursor, IoSink, OutputSink};
pub use crate::token::{TypeKind, TypeToken};
pub use crate::value::Value;
pub use crate::view::{AnyBufferView, TypedView};

pub use spark_flatbuffers_wire as wire;

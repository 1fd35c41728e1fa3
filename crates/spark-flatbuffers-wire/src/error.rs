//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中描述表格式读写过程中可能出现的越界与容量问题；
//! - 启用 `std` 时派生 `thiserror::Error`，在 `no_std` 下手写 `Display`，两种形态语义保持一致。

#[cfg(not(feature = "std"))]
use core::fmt;

#[cfg(feature = "std")]
use thiserror::Error;

/// 表格式错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：读取路径默认“宽容”（越界返回缺省值），只有显式校验或构建路径才需要可诊断的错误；
/// - **契约 (What)**：所有变体均为 `Copy`，携带的偏移/长度以字节为单位，便于直接写入日志；
/// - **权衡 (Trade-offs)**：不区分具体是哪张表出错，定位依赖上层在日志中附带类型名。
#[cfg_attr(feature = "std", derive(Error))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WireError {
    /// 缓冲长度不足以容纳必需的头部字段。
    #[cfg_attr(
        feature = "std",
        error("buffer truncated: need {needed} bytes, have {actual}")
    )]
    Truncated {
        /// 读取所需的最小字节数。
        needed: usize,
        /// 缓冲的实际长度。
        actual: usize,
    },

    /// 根偏移指向缓冲之外。
    #[cfg_attr(
        feature = "std",
        error("root offset {offset} is outside of a {len}-byte buffer")
    )]
    RootOutOfBounds {
        /// 根表的绝对位置。
        offset: usize,
        /// 缓冲长度。
        len: usize,
    },

    /// vtable 位置或长度越界。
    #[cfg_attr(
        feature = "std",
        error("vtable at {position} is outside of a {len}-byte buffer")
    )]
    VTableOutOfBounds {
        /// vtable 的绝对位置（越界时可能为截断后的近似值）。
        position: usize,
        /// 缓冲长度。
        len: usize,
    },

    /// 字段声明的偏移越出表或缓冲范围。
    #[cfg_attr(
        feature = "std",
        error("field at voffset {voffset} points outside of the table")
    )]
    FieldOutOfBounds {
        /// 出错字段的 vtable 偏移。
        voffset: u16,
    },

    /// 表或 vtable 超过 `u16` 可寻址范围。
    #[cfg_attr(
        feature = "std",
        error("table of {size} bytes exceeds the 65535-byte vtable limit")
    )]
    TableTooLarge {
        /// 试图写出的表字节数。
        size: usize,
    },
}

#[cfg(not(feature = "std"))]
impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Truncated { needed, actual } => {
                write!(f, "buffer truncated: need {needed} bytes, have {actual}")
            }
            WireError::RootOutOfBounds { offset, len } => {
                write!(f, "root offset {offset} is outside of a {len}-byte buffer")
            }
            WireError::VTableOutOfBounds { position, len } => {
                write!(f, "vtable at {position} is outside of a {len}-byte buffer")
            }
            WireError::FieldOutOfBounds { voffset } => {
                write!(f, "field at voffset {voffset} points outside of the table")
            }
            WireError::TableTooLarge { size } => {
                write!(f, "table of {size} bytes exceeds the 65535-byte vtable limit")
            }
        }
    }
}

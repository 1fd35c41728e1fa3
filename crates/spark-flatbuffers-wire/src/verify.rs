use crate::read::read_at;
use crate::{UOFFSET_SIZE, WireError};

/// 确认根偏移、vtable 与根表范围都落在缓冲之内。
///
/// # 教案式说明
/// - **意图 (Why)**：读取路径对越界是宽容的，但适配层在把字节交给调用方之前需要一个可诊断的门槛，
///   以便区分“字段缺省”与“数据损坏”；
/// - **逻辑 (How)**：
///   1. 读取根 `uoffset`，确认根表头部的 `soffset` 完整可读；
///   2. 根据 `soffset` 定位 vtable，确认 vtable 头部与全部槽位可读且长度为偶数；
///   3. 确认表体范围与每个非零字段偏移都落在表长之内；
/// - **契约 (What)**：成功返回不代表 schema 层面合法，仅保证后续访问器不会把偏移解析到缓冲之外的头部结构上；
/// - **权衡 (Trade-offs)**：不递归校验字符串/向量的内容范围，这些访问在读取时仍会逐次检查并回退为 `None`。
pub fn check_root(buf: &[u8]) -> Result<(), WireError> {
    let len = buf.len();
    let loc = read_at::<u32>(buf, 0).ok_or(WireError::Truncated {
        needed: UOFFSET_SIZE,
        actual: len,
    })? as usize;

    let soffset = match loc.checked_add(4) {
        Some(end) if end <= len => read_at::<i32>(buf, loc),
        _ => None,
    }
    .ok_or(WireError::RootOutOfBounds { offset: loc, len })?;

    let vtable = i64::try_from(loc)
        .ok()
        .and_then(|loc| loc.checked_sub(i64::from(soffset)))
        .and_then(|pos| usize::try_from(pos).ok())
        .ok_or(WireError::VTableOutOfBounds { position: 0, len })?;

    let out_of_bounds = WireError::VTableOutOfBounds {
        position: vtable,
        len,
    };
    let vtable_len = usize::from(read_at::<u16>(buf, vtable).ok_or(out_of_bounds)?);
    let table_len = usize::from(read_at::<u16>(buf, vtable + 2).ok_or(out_of_bounds)?);
    if vtable_len < 4 || vtable_len % 2 != 0 || vtable + vtable_len > len {
        return Err(out_of_bounds);
    }

    let table_end = loc + table_len;
    if table_len < 4 || table_end > len {
        return Err(WireError::Truncated {
            needed: table_end.max(loc + 4),
            actual: len,
        });
    }

    for voffset in (4..vtable_len).step_by(2) {
        let relative = usize::from(read_at::<u16>(buf, vtable + voffset).ok_or(out_of_bounds)?);
        if relative != 0 && relative >= table_len {
            return Err(WireError::FieldOutOfBounds {
                voffset: voffset as u16,
            });
        }
    }
    Ok(())
}

/// 读取 4 字节小端 size prefix，返回其声明的消息体长度。
///
/// 缓冲不足 4 字节时返回 [`WireError::Truncated`]；声明长度与实际剩余字节的比对交由调用方完成。
pub fn read_size_prefix(buf: &[u8]) -> Result<usize, WireError> {
    read_at::<u32>(buf, 0)
        .map(|len| len as usize)
        .ok_or(WireError::Truncated {
            needed: UOFFSET_SIZE,
            actual: buf.len(),
        })
}

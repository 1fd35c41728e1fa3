use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::{Scalar, UOFFSET_SIZE, VOffset, WireError};

/// 字段在表内的存储形态。
enum Slot {
    /// 标量或内联 struct，直接存放在表体内。
    Inline { bytes: Vec<u8>, align: usize },
    /// 字符串或向量：表体内存放 `uoffset`，数据追加在表之后。
    OutOfLine {
        payload: Vec<u8>,
        len: u32,
        element_align: usize,
        nul_terminated: bool,
    },
}

impl Slot {
    fn inline_size(&self) -> usize {
        match self {
            Slot::Inline { bytes, .. } => bytes.len(),
            Slot::OutOfLine { .. } => UOFFSET_SIZE,
        }
    }

    fn inline_align(&self) -> usize {
        match self {
            Slot::Inline { align, .. } => *align,
            Slot::OutOfLine { .. } => UOFFSET_SIZE,
        }
    }
}

struct Field {
    voffset: VOffset,
    slot: Slot,
}

/// `TableWriter` 收集单张表的字段，并在 `finish` 时一次性产出完整消息。
///
/// # 设计背景（Why）
/// - 生成代码只需按字段调用 `add_*`，不必关心对齐、vtable 与偏移回填；
/// - 先收集后布局，使得字段登记顺序与最终布局解耦，布局规则集中在一处便于审计。
///
/// # 逻辑解析（How）
/// 1. 根 `uoffset` 位于字节 0，vtable 紧随其后（字节 4 起）；
/// 2. 表按最大字段对齐（至少 4 字节）放置，表头为指向 vtable 的 `soffset`；
/// 3. 内联字段按对齐从大到小排列并逐个对齐，字符串/向量在表体内占 4 字节 `uoffset`；
/// 4. 字符串与向量数据依 voffset 顺序追加在表之后，长度前缀 4 字节对齐、元素按自身宽度对齐，
///    最后回填表体内的 `uoffset`。
///
/// # 契约说明（What）
/// - 同一 voffset 重复登记时以最后一次为准；
/// - [`TableWriter::add_scalar`] 在值等于缺省值时省略字段，读取侧自动回退为缺省值；
/// - voffset 必须为不小于 4 的偶数，否则 `finish` 返回 [`WireError::FieldOutOfBounds`]；
/// - 表体或 vtable 超出 `u16` 可寻址范围时返回 [`WireError::TableTooLarge`]。
///
/// # 风险提示（Trade-offs）
/// - 仅支持单张表，嵌套表与表向量不在覆盖范围内。
#[derive(Default)]
pub struct TableWriter {
    fields: Vec<Field>,
}

impl TableWriter {
    /// 创建空构建器。
    pub fn new() -> Self {
        Self::default()
    }

    /// 已登记的字段数量。
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 是否尚未登记任何字段。
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 登记标量字段；`value == default` 时省略。
    pub fn add_scalar<T: Scalar>(&mut self, voffset: VOffset, value: T, default: T) {
        if value == default {
            self.fields.retain(|field| field.voffset != voffset);
            return;
        }
        self.add_scalar_always(voffset, value);
    }

    /// 无论是否等于缺省值都写入标量字段，用于需要后续原地改写的场景。
    pub fn add_scalar_always<T: Scalar>(&mut self, voffset: VOffset, value: T) {
        let mut bytes = vec![0u8; T::SIZE];
        value.write_le(&mut bytes);
        self.push(
            voffset,
            Slot::Inline {
                bytes,
                align: T::SIZE,
            },
        );
    }

    /// 登记内联 struct 字段，`align` 为 struct 的最大成员宽度。
    pub fn add_struct(&mut self, voffset: VOffset, bytes: &[u8], align: usize) {
        self.push(
            voffset,
            Slot::Inline {
                bytes: bytes.to_vec(),
                align: align.max(1),
            },
        );
    }

    /// 登记字符串字段。
    pub fn add_str(&mut self, voffset: VOffset, value: &str) -> Result<(), WireError> {
        let len = u32::try_from(value.len()).map_err(|_| WireError::TableTooLarge {
            size: value.len(),
        })?;
        self.push(
            voffset,
            Slot::OutOfLine {
                payload: value.as_bytes().to_vec(),
                len,
                element_align: 1,
                nul_terminated: true,
            },
        );
        Ok(())
    }

    /// 登记标量向量字段。
    pub fn add_vector<T: Scalar>(
        &mut self,
        voffset: VOffset,
        items: &[T],
    ) -> Result<(), WireError> {
        let len = u32::try_from(items.len()).map_err(|_| WireError::TableTooLarge {
            size: items.len(),
        })?;
        let mut payload = vec![0u8; items.len() * T::SIZE];
        for (item, chunk) in items.iter().zip(payload.chunks_exact_mut(T::SIZE)) {
            item.write_le(chunk);
        }
        self.push(
            voffset,
            Slot::OutOfLine {
                payload,
                len,
                element_align: T::SIZE,
                nul_terminated: false,
            },
        );
        Ok(())
    }

    /// 完成布局并产出消息字节。
    pub fn finish(mut self) -> Result<Vec<u8>, WireError> {
        if let Some(field) = self
            .fields
            .iter()
            .find(|field| field.voffset < 4 || field.voffset % 2 != 0)
        {
            return Err(WireError::FieldOutOfBounds {
                voffset: field.voffset,
            });
        }

        let vtable_len = self
            .fields
            .iter()
            .map(|field| usize::from(field.voffset) + 2)
            .max()
            .unwrap_or(4);
        let table_align = self
            .fields
            .iter()
            .map(|field| field.slot.inline_align())
            .fold(UOFFSET_SIZE, usize::max);

        let vtable_pos = UOFFSET_SIZE;
        let table_pos = align_up(vtable_pos + vtable_len, table_align);

        // 对齐大的字段先排，减少填充。
        self.fields.sort_by(|a, b| {
            b.slot
                .inline_align()
                .cmp(&a.slot.inline_align())
                .then(a.voffset.cmp(&b.voffset))
        });
        let mut relatives = Vec::with_capacity(self.fields.len());
        let mut cursor = 4usize;
        for field in &self.fields {
            cursor = align_up(cursor, field.slot.inline_align());
            relatives.push(cursor);
            cursor += field.slot.inline_size();
        }
        let table_len = cursor;
        if table_len > usize::from(u16::MAX) || vtable_len > usize::from(u16::MAX) {
            return Err(WireError::TableTooLarge {
                size: table_len.max(vtable_len),
            });
        }

        let mut out = vec![0u8; table_pos + table_len];
        write_scalar(&mut out, 0, table_pos as u32);
        write_scalar(&mut out, vtable_pos, vtable_len as u16);
        write_scalar(&mut out, vtable_pos + 2, table_len as u16);
        write_scalar(&mut out, table_pos, (table_pos - vtable_pos) as i32);

        for (field, &relative) in self.fields.iter().zip(&relatives) {
            write_scalar(
                &mut out,
                vtable_pos + usize::from(field.voffset),
                relative as u16,
            );
            if let Slot::Inline { bytes, .. } = &field.slot {
                let start = table_pos + relative;
                out[start..start + bytes.len()].copy_from_slice(bytes);
            }
        }

        let mut out_of_line: Vec<(&Field, usize)> = self
            .fields
            .iter()
            .zip(relatives.iter().copied())
            .filter(|(field, _)| matches!(field.slot, Slot::OutOfLine { .. }))
            .collect();
        out_of_line.sort_by_key(|(field, _)| field.voffset);

        for (field, relative) in out_of_line {
            let Slot::OutOfLine {
                payload,
                len,
                element_align,
                nul_terminated,
            } = &field.slot
            else {
                continue;
            };
            let data_align = (*element_align).max(UOFFSET_SIZE);
            let data_start = align_up(out.len() + UOFFSET_SIZE, data_align);
            let len_pos = data_start - UOFFSET_SIZE;
            out.resize(len_pos, 0);
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(payload);
            if *nul_terminated {
                out.push(0);
            }
            let field_pos = table_pos + relative;
            let offset = u32::try_from(len_pos - field_pos).map_err(|_| WireError::TableTooLarge {
                size: len_pos,
            })?;
            write_scalar(&mut out, field_pos, offset);
        }

        let padded = align_up(out.len(), UOFFSET_SIZE);
        out.resize(padded, 0);
        Ok(out)
    }

    /// 完成布局并在消息前追加 4 字节小端长度前缀。
    pub fn finish_size_prefixed(self) -> Result<Vec<u8>, WireError> {
        let body = self.finish()?;
        let len = u32::try_from(body.len())
            .map_err(|_| WireError::TableTooLarge { size: body.len() })?;
        let mut out = Vec::with_capacity(UOFFSET_SIZE + body.len());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn push(&mut self, voffset: VOffset, slot: Slot) {
        self.fields.retain(|field| field.voffset != voffset);
        self.fields.push(Field { voffset, slot });
    }
}

impl fmt::Debug for TableWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableWriter")
            .field("fields", &self.fields.len())
            .finish()
    }
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

fn write_scalar<T: Scalar>(out: &mut [u8], pos: usize, value: T) {
    value.write_le(&mut out[pos..pos + T::SIZE]);
}

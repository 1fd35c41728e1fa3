//! 消息分帧：整缓冲与 4 字节小端长度前缀两种方式。

use std::borrow::Cow;
use std::ops::Range;

use spark_flatbuffers_wire::{UOFFSET_SIZE, read_size_prefix};

use crate::config::Framing;
use crate::error::CodecError;

/// 在游标剩余字节中界定一条消息。
///
/// 返回消息在 `remaining` 内的范围；`range.end` 即本次应消费的字节数。
/// 调用前 `remaining` 至少有 4 字节。
pub(crate) fn locate_message(
    remaining: &[u8],
    framing: Framing,
) -> Result<Range<usize>, CodecError> {
    match framing {
        Framing::WholeBuffer => Ok(0..remaining.len()),
        Framing::SizePrefixed => {
            let declared = read_size_prefix(remaining).map_err(|_| CodecError::BufferTooSmall {
                available: remaining.len(),
            })?;
            let available = remaining.len() - UOFFSET_SIZE;
            if declared > available {
                return Err(CodecError::IncompleteFrame {
                    declared,
                    available,
                });
            }
            if declared < UOFFSET_SIZE {
                return Err(CodecError::BufferTooSmall {
                    available: declared,
                });
            }
            Ok(UOFFSET_SIZE..UOFFSET_SIZE + declared)
        }
    }
}

/// 按分帧方式组装待写出的字节；整缓冲分帧直接借用载荷。
pub(crate) fn frame_payload(
    payload: &[u8],
    framing: Framing,
) -> Result<Cow<'_, [u8]>, CodecError> {
    match framing {
        Framing::WholeBuffer => Ok(Cow::Borrowed(payload)),
        Framing::SizePrefixed => {
            let len = u32::try_from(payload.len()).map_err(|_| CodecError::MessageTooLarge {
                size: payload.len(),
                limit: u32::MAX as usize,
            })?;
            let mut framed = Vec::with_capacity(UOFFSET_SIZE + payload.len());
            framed.extend_from_slice(&len.to_le_bytes());
            framed.extend_from_slice(payload);
            Ok(Cow::Owned(framed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_buffer_takes_everything() {
        assert_eq!(
            locate_message(&[1, 2, 3, 4, 5], Framing::WholeBuffer).expect("whole"),
            0..5
        );
    }

    #[test]
    fn size_prefix_selects_one_message() {
        let bytes = [4, 0, 0, 0, 9, 9, 9, 9, 7, 7];
        assert_eq!(
            locate_message(&bytes, Framing::SizePrefixed).expect("prefixed"),
            4..8
        );
    }

    #[test]
    fn oversized_prefix_is_incomplete() {
        let bytes = [9, 0, 0, 0, 1, 2];
        assert!(matches!(
            locate_message(&bytes, Framing::SizePrefixed),
            Err(CodecError::IncompleteFrame {
                declared: 9,
                available: 2
            })
        ));
    }

    #[test]
    fn tiny_prefixed_message_is_too_small() {
        let bytes = [2, 0, 0, 0, 1, 2];
        assert!(matches!(
            locate_message(&bytes, Framing::SizePrefixed),
            Err(CodecError::BufferTooSmall { available: 2 })
        ));
    }

    #[test]
    fn prefix_is_prepended_on_write() {
        let framed = frame_payload(b"abcd", Framing::SizePrefixed).expect("framed");
        assert_eq!(&framed[..], &[4, 0, 0, 0, b'a', b'b', b'c', b'd']);
        let whole = frame_payload(b"abcd", Framing::WholeBuffer).expect("whole");
        assert_eq!(&whole[..], b"abcd");
    }
}

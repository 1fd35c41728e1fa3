//! 映射器与管线之间的字节流协作契约。

use std::io;

use bytes::{Bytes, BytesMut};

/// `OutputSink` 是映射器写出字节的目标。
///
/// # 设计背景（Why）
/// - 管线的输出流可能是内存缓冲，也可能是套接字；映射器只需要“尝试写 N 字节并告诉我实际写了多少”；
/// - 不在此处重试：短写作为 [`crate::CodecError::ShortWrite`] 交给调用方，由传输层决定补救策略。
///
/// # 契约说明（What）
/// - `write_simple` 对整段数据只做**一次**写入尝试，返回实际接受的字节数；
/// - 返回 `Err` 表示底层 I/O 失败，返回 `Ok(n)` 且 `n < data.len()` 表示短写。
pub trait OutputSink {
    /// 尝试写出 `data`，返回实际接受的字节数。
    fn write_simple(&mut self, data: &[u8]) -> io::Result<usize>;
}

impl OutputSink for Vec<u8> {
    fn write_simple(&mut self, data: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(data);
        Ok(data.len())
    }
}

impl OutputSink for BytesMut {
    fn write_simple(&mut self, data: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(data);
        Ok(data.len())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_simple(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write_simple(data)
    }
}

/// `IoSink` 把任意 [`io::Write`] 适配为 [`OutputSink`]。
///
/// 只调用一次 [`io::Write::write`]，因此底层写入者的短写会原样暴露给映射器。
#[derive(Debug)]
pub struct IoSink<W> {
    inner: W,
}

impl<W: io::Write> IoSink<W> {
    /// 包装写入者。
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// 借出底层写入者。
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// 取回底层写入者。
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> OutputSink for IoSink<W> {
    fn write_simple(&mut self, data: &[u8]) -> io::Result<usize> {
        self.inner.write(data)
    }
}

/// `InputCursor` 是映射器读取字节的来源。
///
/// # 设计背景（Why）
/// - 入站数据通常已完整位于内存中，映射器需要知道“从哪里开始、还剩多少”，并在消费后推进位置；
///
/// # 契约说明（What）
/// - `data` 返回底层全部存储，`position` 为下一次读取的起点，`total_size` 为有效数据长度；
/// - `set_position` 由映射器在成功取出消息后调用，越过 `total_size` 的值由实现者自行截断；
/// - 映射器从不修改底层字节。
pub trait InputCursor {
    /// 底层全部存储。
    fn data(&self) -> &[u8];

    /// 有效数据总长度。
    fn total_size(&self) -> usize;

    /// 当前读取位置。
    fn position(&self) -> usize;

    /// 移动读取位置。
    fn set_position(&mut self, position: usize);

    /// 剩余可读字节数。
    fn remaining(&self) -> usize {
        self.total_size().saturating_sub(self.position())
    }

    /// 剩余可读字节。
    fn remaining_data(&self) -> &[u8] {
        let end = self.total_size().min(self.data().len());
        self.data().get(self.position()..end).unwrap_or(&[])
    }
}

/// `ByteCursor` 是基于 [`Bytes`] 的内存游标。
#[derive(Clone, Debug, Default)]
pub struct ByteCursor {
    data: Bytes,
    position: usize,
}

impl ByteCursor {
    /// 从任意可转为 [`Bytes`] 的来源构造游标，起点为 0。
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }

    /// 取回底层字节。
    pub fn into_inner(self) -> Bytes {
        self.data
    }

    /// 是否已读完。
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.data.len()
    }
}

impl InputCursor for ByteCursor {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn total_size(&self) -> usize {
        self.data.len()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position.min(self.data.len());
    }
}

impl<C: InputCursor + ?Sized> InputCursor for &mut C {
    fn data(&self) -> &[u8] {
        (**self).data()
    }

    fn total_size(&self) -> usize {
        (**self).total_size()
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn set_position(&mut self, position: usize) {
        (**self).set_position(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 每次最多接受 `limit` 字节的写入者，用于模拟短写。
    struct Throttled {
        limit: usize,
        written: Vec<u8>,
    }

    impl io::Write for Throttled {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn memory_sinks_accept_everything() {
        let mut vec: Vec<u8> = Vec::new();
        assert_eq!(vec.write_simple(b"abc").expect("vec"), 3);
        let mut bytes = BytesMut::new();
        assert_eq!(bytes.write_simple(b"abcd").expect("bytes"), 4);
        assert_eq!(&bytes[..], b"abcd");
    }

    #[test]
    fn io_sink_surfaces_short_writes() {
        let mut sink = IoSink::new(Throttled {
            limit: 2,
            written: Vec::new(),
        });
        assert_eq!(sink.write_simple(b"abcdef").expect("write"), 2);
        assert_eq!(sink.into_inner().written, b"ab");
    }

    #[test]
    fn cursor_tracks_remaining_bytes() {
        let mut cursor = ByteCursor::new(vec![1u8, 2, 3, 4, 5]);
        assert_eq!(cursor.remaining(), 5);
        cursor.set_position(3);
        assert_eq!(cursor.remaining_data(), &[4, 5]);
        cursor.set_position(99);
        assert_eq!(cursor.position(), 5);
        assert!(cursor.is_exhausted());
        assert!(cursor.remaining_data().is_empty());
    }
}

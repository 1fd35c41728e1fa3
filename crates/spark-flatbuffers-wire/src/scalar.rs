/// `Scalar` 描述可以按小端字节直接读写的定长标量。
///
/// # 契约说明（What）
/// - `SIZE` 即线格式中的字节宽度，同时也是构建器使用的对齐值；
/// - `read_le` 的输入切片长度必须恰好为 `SIZE`，调用方（[`crate::Table`] 等）负责先做越界检查；
/// - `write_le` 的输出切片长度同样必须为 `SIZE`。
///
/// # 风险提示（Trade-offs）
/// - `bool` 以单字节存储，非零即真，与 FlatBuffers 其他语言实现保持一致。
pub trait Scalar: Copy + PartialEq + Send + Sync + 'static {
    /// 线格式宽度（字节）。
    const SIZE: usize;

    /// 从小端字节还原标量。
    fn read_le(bytes: &[u8]) -> Self;

    /// 将标量写为小端字节。
    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const SIZE: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; core::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Scalar for bool {
    const SIZE: usize = 1;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out[0] = u8::from(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_layout_is_used() {
        let mut out = [0u8; 4];
        0x0102_0304u32.write_le(&mut out);
        assert_eq!(out, [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(u32::read_le(&out), 0x0102_0304);
    }

    #[test]
    fn bool_treats_any_non_zero_as_true() {
        assert!(bool::read_le(&[7]));
        assert!(!bool::read_le(&[0]));
    }
}

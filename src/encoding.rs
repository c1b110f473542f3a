use std::{
    io,
    mem::size_of,
};

use bytes::{
    Buf,
    BufMut,
    BytesMut,
};

/// A shared trait for encoding and decoding fixed-width values in and out of
/// the little-endian record format used by persistence.
///
/// Every value of a given type encodes to exactly [`Self::ENCODED_SIZE`]
/// bytes, so a reader can walk a file of records without any length prefix.
pub trait FixedCodec: Sized {
    /// The size of the encoded value in bytes.
    const ENCODED_SIZE: usize;

    /// Append the encoded value to `buf`.
    fn encode(&self, buf: &mut BytesMut);

    /// Decode a value from `src`, which is exactly [`Self::ENCODED_SIZE`]
    /// bytes long.
    fn decode(src: &[u8]) -> io::Result<Self>;
}

macro_rules! fixed_codec {
    ($($t:ty => $put:ident, $get:ident);* $(;)?) => {
        $(
            impl FixedCodec for $t {
                const ENCODED_SIZE: usize = size_of::<$t>();

                #[inline]
                fn encode(&self, buf: &mut BytesMut) {
                    buf.$put(*self);
                }

                #[inline]
                fn decode(mut src: &[u8]) -> io::Result<Self> {
                    Ok(src.$get())
                }
            }
        )*
    };
}

fixed_codec! {
    u8 => put_u8, get_u8;
    i8 => put_i8, get_i8;
    u16 => put_u16_le, get_u16_le;
    i16 => put_i16_le, get_i16_le;
    u32 => put_u32_le, get_u32_le;
    i32 => put_i32_le, get_i32_le;
    u64 => put_u64_le, get_u64_le;
    i64 => put_i64_le, get_i64_le;
    u128 => put_u128_le, get_u128_le;
    i128 => put_i128_le, get_i128_le;
    f32 => put_f32_le, get_f32_le;
    f64 => put_f64_le, get_f64_le;
}

impl FixedCodec for bool {
    const ENCODED_SIZE: usize = 1;

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(*self as u8);
    }

    fn decode(src: &[u8]) -> io::Result<Self> {
        Ok(src[0] != 0)
    }
}

impl FixedCodec for char {
    const ENCODED_SIZE: usize = size_of::<u32>();

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32_le(*self as u32);
    }

    fn decode(src: &[u8]) -> io::Result<Self> {
        let scalar = u32::decode(src)?;
        char::from_u32(scalar).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid unicode scalar {scalar:#x}"),
            )
        })
    }
}

impl<const N: usize> FixedCodec for [u8; N] {
    const ENCODED_SIZE: usize = N;

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(self);
    }

    fn decode(src: &[u8]) -> io::Result<Self> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(&src[..N]);
        Ok(arr)
    }
}

impl<A: FixedCodec, B: FixedCodec> FixedCodec for (A, B) {
    const ENCODED_SIZE: usize = A::ENCODED_SIZE + B::ENCODED_SIZE;

    fn encode(&self, buf: &mut BytesMut) {
        self.0.encode(buf);
        self.1.encode(buf);
    }

    fn decode(src: &[u8]) -> io::Result<Self> {
        let (a, b) = src.split_at(A::ENCODED_SIZE);
        Ok((A::decode(a)?, B::decode(b)?))
    }
}

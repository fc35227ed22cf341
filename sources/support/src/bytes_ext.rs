use anyhow::anyhow;

/**
    This macro builds a set of try_get_{number_type} functions for safe reading of
    bytes from any bytes::Buf. They return Result<T> instead of panicking
**/
macro_rules! impl_safebuf {
    ( $($type:ty),* ) => {
        pub trait SafeBuf: bytes::Buf {
            paste::paste! {
                $(
                fn [<try_get_ $type>](&mut self) -> anyhow::Result<$type> {
                    if self.remaining() >= std::mem::size_of::<$type>() {
                        Ok(self.[<get_ $type>]())
                    } else {
                        Err(anyhow!("out of bytes"))
                    }
                }
                )*
            }

            fn try_take(&mut self, len: usize) -> anyhow::Result<Vec<u8>> {
                if self.remaining() < len {
                    return Err(anyhow!("out of bytes (wanted {}, had {})", len, self.remaining()));
                }

                let mut out = vec![0; len];
                self.copy_to_slice(&mut out);
                Ok(out)
            }
        }

        impl<T: bytes::Buf> SafeBuf for T { }
    }
}

impl_safebuf!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

use anyhow::{anyhow, Result};

pub trait EncodingFormat {
    fn into_java(str: &str) -> Vec<u8>;
    fn from_java(data: &[u8]) -> Result<String>;
}

/// The "modified UTF-8" of `CONSTANT_Utf8` entries (JVMS 4.4.7).
///
/// It differs from UTF-8 in two ways: NUL is encoded as `C0 80`, and characters outside
/// the BMP are encoded as a surrogate pair, each half as its own 3 byte sequence.
pub struct ModifiedUtf8;

impl EncodingFormat for ModifiedUtf8 {
    fn into_java(str: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(str.len());

        for ch in str.chars() {
            match ch as u32 {
                0 => out.extend_from_slice(&[0xc0, 0x80]),
                c @ 0x01..=0x7f => out.push(c as u8),
                c @ 0x80..=0x7ff => {
                    out.push(0xc0 | (c >> 6) as u8);
                    out.push(0x80 | (c & 0x3f) as u8);
                }
                c @ 0x800..=0xffff => push_three(&mut out, c),
                _ => {
                    let mut units = [0; 2];
                    for unit in ch.encode_utf16(&mut units) {
                        push_three(&mut out, u32::from(*unit));
                    }
                }
            }
        }

        out
    }

    fn from_java(data: &[u8]) -> Result<String> {
        ModifiedUtf8Chars::new(data).collect()
    }
}

fn push_three(out: &mut Vec<u8>, c: u32) {
    out.push(0xe0 | (c >> 12) as u8);
    out.push(0x80 | ((c >> 6) & 0x3f) as u8);
    out.push(0x80 | (c & 0x3f) as u8);
}

struct ModifiedUtf8Chars<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> ModifiedUtf8Chars<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            failed: false,
        }
    }

    fn continuation(&mut self) -> Result<u32> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(anyhow!("truncated modified UTF-8 sequence"))?;

        if byte & 0xc0 != 0x80 {
            return Err(anyhow!("bad continuation byte {:#04x} @ {}", byte, self.pos));
        }

        self.pos += 1;
        Ok(u32::from(byte & 0x3f))
    }

    /// One 1, 2 or 3 byte unit. Surrogate halves come back unpaired.
    fn unit(&mut self) -> Result<u32> {
        let start = self.pos;
        let a = self.data[start];
        self.pos += 1;

        match a {
            0x00 => Err(anyhow!("raw NUL byte @ {}", start)),
            0x01..=0x7f => Ok(u32::from(a)),
            0xc0..=0xdf => {
                let c = (u32::from(a & 0x1f) << 6) | self.continuation()?;

                // C0 80 is the only overlong form allowed
                if c == 0 || c >= 0x80 {
                    Ok(c)
                } else {
                    Err(anyhow!("overlong sequence @ {}", start))
                }
            }
            0xe0..=0xef => {
                let b = self.continuation()?;
                let c = self.continuation()?;
                let c = (u32::from(a & 0x0f) << 12) | (b << 6) | c;

                if c >= 0x800 {
                    Ok(c)
                } else {
                    Err(anyhow!("overlong sequence @ {}", start))
                }
            }
            _ => Err(anyhow!("invalid modified UTF-8 lead byte {:#04x} @ {}", a, start)),
        }
    }

    fn decode(&mut self) -> Result<char> {
        let start = self.pos;
        let unit = self.unit()?;

        let c = match unit {
            0xd800..=0xdbff => {
                if self.pos >= self.data.len() {
                    return Err(anyhow!("unpaired surrogate @ {}", start));
                }

                let low = self.unit()?;
                if !(0xdc00..=0xdfff).contains(&low) {
                    return Err(anyhow!("unpaired surrogate @ {}", start));
                }

                0x10000 + ((unit - 0xd800) << 10) + (low - 0xdc00)
            }
            0xdc00..=0xdfff => return Err(anyhow!("unpaired surrogate @ {}", start)),
            c => c,
        };

        char::from_u32(c).ok_or(anyhow!("invalid code point {:#x} @ {}", c, start))
    }
}

impl<'a> Iterator for ModifiedUtf8Chars<'a> {
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }

        let decoded = self.decode();
        self.failed = decoded.is_err();
        Some(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_unchanged() -> Result<()> {
        assert_eq!(ModifiedUtf8::into_java("access$000"), b"access$000".to_vec());
        assert_eq!(ModifiedUtf8::from_java(b"access$000")?, "access$000");

        Ok(())
    }

    #[test]
    fn nul_uses_the_two_byte_form() -> Result<()> {
        assert_eq!(ModifiedUtf8::into_java("a\0b"), vec![b'a', 0xc0, 0x80, b'b']);
        assert_eq!(ModifiedUtf8::from_java(&[b'a', 0xc0, 0x80, b'b'])?, "a\0b");
        assert!(ModifiedUtf8::from_java(&[b'a', 0x00]).is_err());

        Ok(())
    }

    #[test]
    fn supplementary_characters_are_surrogate_pairs() -> Result<()> {
        // U+1D465 MATHEMATICAL ITALIC SMALL X
        let pair = [0xed, 0xa0, 0xb5, 0xed, 0xb1, 0xa5];

        assert_eq!(ModifiedUtf8::into_java("\u{1d465}"), pair.to_vec());
        assert_eq!(ModifiedUtf8::from_java(&pair)?, "\u{1d465}");

        // Plain UTF-8 spells it with a 4 byte sequence, which is not allowed here
        assert!(ModifiedUtf8::from_java("\u{1d465}".as_bytes()).is_err());

        Ok(())
    }

    #[test]
    fn bmp_characters_match_utf8() -> Result<()> {
        let name = "Größe€";
        assert_eq!(ModifiedUtf8::into_java(name), name.as_bytes().to_vec());
        assert_eq!(ModifiedUtf8::from_java(name.as_bytes())?, name);

        Ok(())
    }

    #[test]
    fn malformed_input_is_rejected() {
        // lone high surrogate, lone low surrogate, truncated, overlong '/'
        assert!(ModifiedUtf8::from_java(&[0xed, 0xa0, 0xb5]).is_err());
        assert!(ModifiedUtf8::from_java(&[0xed, 0xb1, 0xa5, b'x']).is_err());
        assert!(ModifiedUtf8::from_java(&[0xe2, 0x82]).is_err());
        assert!(ModifiedUtf8::from_java(&[0xc0, 0xaf]).is_err());
    }
}

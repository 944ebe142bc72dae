//! IMET - channel-name banner block inside Wii title contents.
//!
//! The first content of an installable title opens with a 0x40-byte
//! build header followed by the IMET block, which carries the channel
//! name in ten languages, two 21-character UTF-16BE lines per language.
//!
//! ## Layout (relative to the IMET block, after the build header)
//! ```text
//! [0x00] Magic "IMET"             (4 bytes)
//! [0x04] HashSize (0x600)         (u32 BE)
//! [0x08] FileCount (3)            (u32 BE)
//! [0x0C] IconSize                 (u32 BE)
//! [0x10] BannerSize               (u32 BE)
//! [0x14] SoundSize                (u32 BE)
//! [0x18] Flags                    (u32 BE)
//! [0x1C] Names: 10 × 2 × 21 UTF-16BE chars  (0x348 bytes)
//! ```
//!
//! DLC titles carry a WIBN block here instead; its magic fails the IMET
//! check and the caller treats the banner as absent.

use crate::utils::utf16_be_string;
use crate::{Error, Result};

/// Magic of an IMET banner block.
pub const IMET_MAGIC: [u8; 4] = *b"IMET";

const LANG_COUNT: usize = 10;
const LINES: usize = 2;
const LINE_CHARS: usize = 21;
const NAMES_OFFSET: usize = 0x1C;

/// Bytes needed to parse the magic, size table, and all name entries.
pub const IMET_SIZE: usize = NAMES_OFFSET + LANG_COUNT * LINES * LINE_CHARS * 2;

/// Languages with a name slot in an IMET block, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Language {
    Japanese = 0,
    English = 1,
    German = 2,
    French = 3,
    Spanish = 4,
    Italian = 5,
    Dutch = 6,
    SimplifiedChinese = 7,
    TraditionalChinese = 8,
    Korean = 9,
}

/// Parsed IMET channel names.
#[derive(Debug, Clone)]
pub struct Imet {
    names: [[String; LINES]; LANG_COUNT],
}

impl Imet {
    /// Parse an IMET block from `buf`.
    ///
    /// `buf` must hold at least [`IMET_SIZE`] bytes starting at the IMET
    /// magic. [`Error::BadMagic`] when the block is something else
    /// (e.g. a WIBN banner).
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < IMET_SIZE {
            return Err(Error::UnexpectedEof);
        }
        if buf[..4] != IMET_MAGIC {
            return Err(Error::BadMagic);
        }
        let names = std::array::from_fn(|lang| {
            std::array::from_fn(|line| {
                let off = NAMES_OFFSET + (lang * LINES + line) * LINE_CHARS * 2;
                utf16_be_string(&buf[off..off + LINE_CHARS * 2], LINE_CHARS)
            })
        });
        Ok(Self { names })
    }

    /// Channel name for `lang`, up to two lines joined with `\n`.
    ///
    /// Falls back to English when the preferred language's entry is
    /// empty; [`None`] when no usable name exists at all.
    pub fn name(&self, lang: Language) -> Option<String> {
        let mut idx = lang as usize;
        if self.names[idx][0].is_empty() {
            idx = Language::English as usize;
        }
        let first = &self.names[idx][0];
        if first.is_empty() {
            return None;
        }
        let mut out = first.clone();
        if !self.names[idx][1].is_empty() {
            out.push('\n');
            out.push_str(&self.names[idx][1]);
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_name(buf: &mut [u8], lang: Language, line: usize, text: &str) {
        let off = NAMES_OFFSET + (lang as usize * LINES + line) * LINE_CHARS * 2;
        for (i, unit) in text.encode_utf16().take(LINE_CHARS).enumerate() {
            buf[off + i * 2..off + i * 2 + 2].copy_from_slice(&unit.to_be_bytes());
        }
    }

    fn block() -> Vec<u8> {
        let mut buf = vec![0u8; IMET_SIZE];
        buf[..4].copy_from_slice(&IMET_MAGIC);
        buf
    }

    #[test]
    fn two_lines_join_with_newline() {
        let mut buf = block();
        put_name(&mut buf, Language::English, 0, "Example Channel");
        put_name(&mut buf, Language::English, 1, "Second Line");
        let imet = Imet::parse(&buf).unwrap();
        assert_eq!(
            imet.name(Language::English).unwrap(),
            "Example Channel\nSecond Line"
        );
    }

    #[test]
    fn empty_preferred_language_falls_back_to_english() {
        let mut buf = block();
        put_name(&mut buf, Language::English, 0, "Fallback");
        put_name(&mut buf, Language::French, 0, "Chaîne d'exemple");
        let imet = Imet::parse(&buf).unwrap();
        assert_eq!(imet.name(Language::French).unwrap(), "Chaîne d'exemple");
        assert_eq!(imet.name(Language::German).unwrap(), "Fallback");
        assert_eq!(imet.name(Language::Japanese).unwrap(), "Fallback");
    }

    #[test]
    fn no_names_at_all_is_none() {
        let imet = Imet::parse(&block()).unwrap();
        assert!(imet.name(Language::English).is_none());
    }

    #[test]
    fn wrong_magic_and_short_buffer() {
        let mut buf = block();
        buf[..4].copy_from_slice(b"WIBN");
        assert!(matches!(Imet::parse(&buf), Err(Error::BadMagic)));
        assert!(matches!(
            Imet::parse(&vec![0u8; IMET_SIZE - 1]),
            Err(Error::UnexpectedEof)
        ));
    }
}

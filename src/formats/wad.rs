//! WAD - installable Wii title package.
//!
//! A WAD bundles everything needed to install one title: a certificate
//! chain, the signing ticket, the title metadata (TMD), and the content
//! files themselves, which are AES-128-CBC encrypted with a per-title
//! key. Only the fields needed for metadata display are decoded here;
//! contents are never extracted.
//!
//! ## Overall layout (all integers big-endian)
//! ```text
//! [0x00] Header     (0x20 bytes; see below)
//! [  + ] CertChain  (cert_chain_size bytes)
//! [  + ] Ticket     (ticket_size bytes, ≥ 0x2A4)
//! [  + ] TMD        (tmd_size bytes, ≥ 0x1E4)
//! [  + ] Data       (data_size bytes, encrypted)
//! [  + ] Footer     (footer_size bytes)
//! ```
//! Every section occupies its declared size rounded up to a 64-byte
//! boundary.
//!
//! ## Header (0x20 bytes)
//! ```text
//! [0x00] HeaderSize (= 0x20)       (u32)
//! [0x04] Type "Is" / "ib" / "Bk"   (4 bytes)
//! [0x08] CertChainSize             (u32)
//! [0x0C] Reserved                  (u32)
//! [0x10] TicketSize                (u32)
//! [0x14] TmdSize                   (u32)
//! [0x18] DataSize                  (u32)
//! [0x1C] FooterSize                (u32)
//! ```
//!
//! ## Ticket fields used here (structure is 0x2A4 bytes)
//! ```text
//! [0x140] SignatureIssuer          (0x40 bytes, NUL-padded)
//! [0x1BF] EncTitleKey              (16 bytes)
//! [0x1DC] TitleId                  (u64)
//! [0x1F1] CommonKeyIndex           (1 byte)
//! ```
//!
//! ## TMD header fields used here (header is 0x1E4 bytes)
//! ```text
//! [0x184] SysVersion (required IOS) (u64)
//! [0x18C] TitleId                   (u64)
//! [0x1DC] TitleVersion              (u16)
//! ```
//!
//! ## Title key derivation
//! The ticket's title key is itself AES-128-CBC encrypted under a common
//! system key selected by the signature issuer and the common-key index.
//! Its IV is the title ID in the high 8 bytes, zeros below. The data
//! region then decrypts with the title key and an IV built from the
//! content index (zero for the first content).

use std::sync::Arc;

use crate::detect::{Capabilities, FormatDescriptor, HeaderProbe};
use crate::keys::{KeyStore, VerifyResult};
use crate::romdata::{Field, FieldList, MetaDataList, Property, RomData};
use crate::source::SharedSource;
use crate::utils::{align64, be_u16, be_u32, be_u64, cstr_field};
use crate::{Error, Result};

use super::imet::Language;

#[cfg(feature = "crypto")]
use super::imet::{self, Imet};
#[cfg(feature = "crypto")]
use crate::crypto::{cipher::BlockCipher, reader::CbcReader};
#[cfg(feature = "crypto")]
use crate::keys::KeyEntry;

/// WAD header size.
pub const HEADER_SIZE: usize = 0x20;
/// Minimum ticket size.
pub const TICKET_SIZE: usize = 0x2A4;
/// TMD header size (content records follow it).
pub const TMD_HEADER_SIZE: usize = 0x1E4;
/// Build header preceding the banner block in content 0.
const CONTENT_HEADER_SIZE: u64 = 0x40;

// Accepted type fields: installable package, boot partition, backup.
const TYPE_IS: [u8; 4] = *b"Is\0\0";
const TYPE_IB: [u8; 4] = *b"ib\0\0";
const TYPE_BK: [u8; 4] = *b"Bk\0\0";

/// Signature issuer of debug-signed (RVT) tickets.
const DEBUG_ISSUER: &[u8] = b"Root-CA00000002-XS00000006";

/// Format descriptor for the WAD container.
pub static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    name: "wad",
    extensions: &["wad"],
    mime_types: &["application/x-wii-wad"],
    capabilities: Capabilities::EXTERNAL_ARTWORK,
    matches,
    instantiate,
};

fn matches(probe: &HeaderProbe) -> bool {
    let Some(raw) = probe.header.first_chunk::<HEADER_SIZE>() else {
        return false;
    };
    let header = WadHeader::parse(raw);
    if header.header_size as usize != HEADER_SIZE {
        return false;
    }
    if !matches!(header.kind, TYPE_IS | TYPE_IB | TYPE_BK) {
        return false;
    }
    if (header.ticket_size as usize) < TICKET_SIZE {
        return false;
    }
    if (header.tmd_size as usize) < TMD_HEADER_SIZE {
        return false;
    }
    // The file must hold all declared sections plus at least the content
    // build header; anything shorter cannot be parsed.
    header.minimum_file_size() <= probe.file_size
}

fn instantiate(source: SharedSource, keys: Arc<KeyStore>) -> Box<dyn RomData> {
    Box::new(WadTitle::open(source, &keys))
}

/// Common system keys a WAD ticket can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemKey {
    Retail,
    Korean,
    Vwii,
    Debug,
}

impl SystemKey {
    fn select(ticket: &Ticket) -> Self {
        if cstr_field(&ticket.issuer) == DEBUG_ISSUER {
            return Self::Debug;
        }
        match ticket.common_key_index {
            1 => Self::Korean,
            2 => Self::Vwii,
            // Indices past the known range select the default retail key.
            _ => Self::Retail,
        }
    }

    /// Keyring name of this key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Retail => "rvl-common",
            Self::Korean => "rvl-korean",
            Self::Vwii => "vwii-common",
            Self::Debug => "rvt-debug",
        }
    }

    /// Display label for the encryption-key field.
    fn label(self) -> &'static str {
        match self {
            Self::Retail => "Retail",
            Self::Korean => "Korean",
            Self::Vwii => "vWii",
            Self::Debug => "Debug",
        }
    }

    /// Known ciphertext of [`crate::keys::VERIFY_PLAINTEXT`] under this
    /// key, used to validate keyring entries before trusting them.
    #[cfg(feature = "crypto")]
    fn verify_data(self) -> &'static [u8; 16] {
        match self {
            Self::Retail => &[
                0x86, 0x16, 0x2B, 0x65, 0xA5, 0x73, 0x7C, 0x79, 0xB6, 0x77, 0xF5, 0x8A, 0x14,
                0xA2, 0xB6, 0x57,
            ],
            Self::Korean => &[
                0xD8, 0xC3, 0x17, 0xBE, 0xDB, 0x29, 0xC7, 0xD0, 0x66, 0xC2, 0x2B, 0x86, 0x53,
                0x49, 0x5B, 0xFA,
            ],
            Self::Vwii => &[
                0x7B, 0x81, 0xE2, 0x90, 0x18, 0xD8, 0x29, 0x2A, 0x3B, 0x61, 0x16, 0xFC, 0x11,
                0xC7, 0x8A, 0xD1,
            ],
            Self::Debug => &[
                0xF7, 0x97, 0xD6, 0x99, 0x37, 0xDE, 0xE8, 0x4E, 0x1F, 0x14, 0x6A, 0xCE, 0x30,
                0xAA, 0x11, 0xB2,
            ],
        }
    }
}

/// Parsed 0x20-byte WAD header.
#[derive(Debug, Clone, Copy)]
struct WadHeader {
    header_size: u32,
    kind: [u8; 4],
    cert_chain_size: u32,
    ticket_size: u32,
    tmd_size: u32,
    data_size: u32,
}

impl WadHeader {
    fn parse(buf: &[u8; HEADER_SIZE]) -> Self {
        let mut kind = [0u8; 4];
        kind.copy_from_slice(&buf[0x04..0x08]);
        Self {
            header_size: be_u32(buf, 0x00),
            kind,
            cert_chain_size: be_u32(buf, 0x08),
            ticket_size: be_u32(buf, 0x10),
            tmd_size: be_u32(buf, 0x14),
            data_size: be_u32(buf, 0x18),
        }
    }

    fn ticket_offset(&self) -> u64 {
        align64(self.header_size) + align64(self.cert_chain_size)
    }

    fn tmd_offset(&self) -> u64 {
        self.ticket_offset() + align64(self.ticket_size)
    }

    fn data_offset(&self) -> u64 {
        self.tmd_offset() + align64(self.tmd_size)
    }

    fn minimum_file_size(&self) -> u64 {
        self.data_offset() + CONTENT_HEADER_SIZE
    }
}

/// Fields of the signing ticket this decoder consumes.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    issuer: [u8; 0x40],
    enc_title_key: [u8; 16],
    title_id: u64,
    common_key_index: u8,
}

impl Ticket {
    fn parse(buf: &[u8; TICKET_SIZE]) -> Self {
        let mut issuer = [0u8; 0x40];
        issuer.copy_from_slice(&buf[0x140..0x180]);
        let mut enc_title_key = [0u8; 16];
        enc_title_key.copy_from_slice(&buf[0x1BF..0x1CF]);
        Self {
            issuer,
            enc_title_key,
            title_id: be_u64(buf, 0x1DC),
            common_key_index: buf[0x1F1],
        }
    }
}

/// Fields of the TMD header this decoder consumes.
#[derive(Debug, Clone, Copy)]
struct TmdHeader {
    sys_version: u64,
    title_id: u64,
    title_version: u16,
}

impl TmdHeader {
    fn parse(buf: &[u8; TMD_HEADER_SIZE]) -> Self {
        Self {
            sys_version: be_u64(buf, 0x184),
            title_id: be_u64(buf, 0x18C),
            title_version: be_u16(buf, 0x1DC),
        }
    }

    /// Four-character game ID, when the low title-ID bytes are printable.
    fn game_id(&self) -> Option<String> {
        let bytes = self.title_id.to_be_bytes();
        let id4 = &bytes[4..8];
        id4.iter()
            .all(u8::is_ascii_alphanumeric)
            .then(|| String::from_utf8_lossy(id4).into_owned())
    }

    /// Region character: the fourth character of the game ID.
    ///
    /// System titles (title-ID high word 1, i.e. IOS and the System
    /// Menu) have no region character.
    fn region_char(&self) -> Option<char> {
        if (self.title_id >> 32) as u32 == 0x0000_0001 {
            return None;
        }
        Some(self.title_id.to_be_bytes()[7] as char)
    }

    fn region(&self) -> String {
        match self.region_char() {
            None | Some('A') => "Region-Free".to_owned(),
            Some('E') => "USA".to_owned(),
            Some('J') => "Japan".to_owned(),
            Some('W') => "Taiwan".to_owned(),
            Some('K') | Some('T') | Some('Q') => "South Korea".to_owned(),
            Some('C') => "China".to_owned(),
            Some(c) if c.is_ascii_uppercase() => "Europe".to_owned(),
            Some(c) => format!("Unknown (0x{:02X})", c as u32),
        }
    }

    /// Required IOS, when the sys-version field names one.
    fn ios_version(&self) -> Option<String> {
        let hi = (self.sys_version >> 32) as u32;
        let lo = self.sys_version as u32;
        if hi == 1 && lo > 2 && lo < 0x300 {
            // Standard IOS slot.
            Some(format!("IOS{lo}"))
        } else if self.sys_version != 0 {
            Some(format!("{hi:08X}-{lo:08X}"))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Parsed {
    header: WadHeader,
    ticket: Ticket,
    tmd: TmdHeader,
    key: SystemKey,
}

/// Decoder for an installable Wii title package.
///
/// Construct via [`WadTitle::open`] (or through a
/// [`crate::detect::FormatRegistry`]) and check
/// [`RomData::is_valid`] before querying fields.
pub struct WadTitle {
    source: Option<SharedSource>,
    parsed: Option<Parsed>,
    key_status: VerifyResult,
    language: Language,
    #[cfg(feature = "crypto")]
    reader: Option<CbcReader>,
    #[cfg(feature = "crypto")]
    imet: Option<Imet>,
    fields: Option<FieldList>,
    meta: Option<MetaDataList>,
}

impl WadTitle {
    /// Open and validate a WAD from `source`.
    ///
    /// Structural problems (truncation, bad sizes, unknown type) leave
    /// the instance invalid with the source released. Key and decryption
    /// problems do not: the instance stays valid and reports them
    /// through a warning field and [`WadTitle::key_status`].
    pub fn open(source: SharedSource, keys: &KeyStore) -> Self {
        let mut wad = Self {
            source: Some(source),
            parsed: None,
            key_status: VerifyResult::Unknown,
            language: Language::English,
            #[cfg(feature = "crypto")]
            reader: None,
            #[cfg(feature = "crypto")]
            imet: None,
            fields: None,
            meta: None,
        };
        if let Err(e) = wad.load(keys) {
            log::debug!("wad: validation failed: {e}");
            wad.parsed = None;
            wad.close();
        }
        wad
    }

    fn load(&mut self, keys: &KeyStore) -> Result<()> {
        let source = self.source.as_ref().ok_or(Error::NotOpen)?;
        let file_size = source.size()?;

        let mut raw_header = [0u8; HEADER_SIZE];
        source.read_exact_at(0, &mut raw_header)?;

        // Re-run the descriptor predicate: open() is also reachable
        // directly, without a registry in front of it.
        let probe = HeaderProbe {
            header: &raw_header,
            file_size,
            ext: None,
        };
        if !matches(&probe) {
            return Err(Error::UnknownFormat);
        }
        let header = WadHeader::parse(&raw_header);

        let mut raw_ticket = [0u8; TICKET_SIZE];
        source.read_exact_at(header.ticket_offset(), &mut raw_ticket)?;
        let ticket = Ticket::parse(&raw_ticket);

        let mut raw_tmd = [0u8; TMD_HEADER_SIZE];
        source.read_exact_at(header.tmd_offset(), &mut raw_tmd)?;
        let tmd = TmdHeader::parse(&raw_tmd);

        let key = SystemKey::select(&ticket);
        self.parsed = Some(Parsed {
            header,
            ticket,
            tmd,
            key,
        });

        // Everything past this point needs the system key. Failures are
        // reported through key_status and leave the instance valid.
        self.init_crypto(keys);
        Ok(())
    }

    #[cfg(feature = "crypto")]
    fn init_crypto(&mut self, keys: &KeyStore) {
        let Some(parsed) = self.parsed else {
            return;
        };
        let Some(source) = self.source.clone() else {
            return;
        };

        let (status, entry) = keys.get_and_verify(
            parsed.key.name(),
            Some(parsed.key.verify_data()),
        );
        self.key_status = status;
        let Some(system_key) = entry.and_then(KeyEntry::key16) else {
            log::debug!(
                "wad: no usable {} key: {}",
                parsed.key.name(),
                status.description()
            );
            return;
        };

        // Unwrap the title key: CBC, IV = title ID in the high 8 bytes.
        let mut iv = [0u8; 16];
        iv[..8].copy_from_slice(&parsed.ticket.title_id.to_be_bytes());
        let mut title_key = parsed.ticket.enc_title_key;
        BlockCipher::new(system_key).decrypt_block_cbc(&mut title_key, &iv);

        // Data-area IV: big-endian content index, zeros below. Only the
        // first content is read here, so the index is zero.
        let reader = CbcReader::new(
            source,
            parsed.header.data_offset(),
            u64::from(parsed.header.data_size),
            &title_key,
            [0u8; 16],
        );

        // The banner sits past the content build header. Its absence is
        // not an error; ticket and TMD fields are still shown.
        let mut raw_imet = [0u8; imet::IMET_SIZE];
        if reader.read(CONTENT_HEADER_SIZE, &mut raw_imet).is_ok() {
            match Imet::parse(&raw_imet) {
                Ok(parsed_imet) => self.imet = Some(parsed_imet),
                Err(_) => log::debug!("wad: content 0 carries no IMET banner"),
            }
        }
        self.reader = Some(reader);
    }

    #[cfg(not(feature = "crypto"))]
    fn init_crypto(&mut self, _keys: &KeyStore) {
        self.key_status = VerifyResult::DecryptionUnsupported;
    }

    /// Key-verification outcome for the selected system key.
    pub fn key_status(&self) -> VerifyResult {
        self.key_status
    }

    /// Four-character game ID, for external artwork lookups.
    pub fn game_id(&self) -> Option<String> {
        self.parsed.as_ref().and_then(|p| p.tmd.game_id())
    }

    /// Region character of the game ID, for external artwork lookups.
    pub fn region_code(&self) -> Option<char> {
        self.parsed.as_ref().and_then(|p| p.tmd.region_char())
    }

    /// Preferred banner language. Defaults to English.
    ///
    /// Has no effect once fields have been loaded.
    pub fn set_language(&mut self, language: Language) {
        if self.fields.is_none() && self.meta.is_none() {
            self.language = language;
        }
    }

    #[cfg(feature = "crypto")]
    fn game_info(&self) -> Option<String> {
        self.imet.as_ref().and_then(|imet| imet.name(self.language))
    }

    #[cfg(not(feature = "crypto"))]
    fn game_info(&self) -> Option<String> {
        None
    }

    fn build_fields(&self, parsed: &Parsed) -> FieldList {
        let mut fields = Vec::with_capacity(8);

        if self.key_status != VerifyResult::Ok {
            fields.push(Field::warning("Warning", self.key_status.description()));
        }

        let tid = parsed.tmd.title_id;
        fields.push(Field::text(
            "Title ID",
            format!("{:08X}-{:08X}", (tid >> 32) as u32, tid as u32),
        ));

        if let Some(id4) = parsed.tmd.game_id() {
            fields.push(Field::text("Game ID", id4));
        }

        let version = parsed.tmd.title_version;
        fields.push(Field::text(
            "Title Version",
            format!("{}.{} (v{})", version >> 8, version & 0xFF, version),
        ));

        fields.push(Field::text("Region", parsed.tmd.region()));

        if let Some(ios) = parsed.tmd.ios_version() {
            fields.push(Field::text("IOS Version", ios));
        }

        fields.push(Field::text("Encryption Key", parsed.key.label()));

        if let Some(info) = self.game_info() {
            fields.push(Field::text("Game Info", info));
        }

        fields
    }
}

impl RomData for WadTitle {
    fn system_name(&self) -> &'static str {
        "Nintendo Wii"
    }

    fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }

    fn fields(&mut self) -> Result<&FieldList> {
        let Some(ref fields) = self.fields else {
            let Some(parsed) = self.parsed else {
                return Err(Error::UnknownFormat);
            };
            if self.source.is_none() {
                return Err(Error::NotOpen);
            }
            let list = self.build_fields(&parsed);
            return Ok(self.fields.insert(list));
        };
        Ok(fields)
    }

    fn meta_data(&mut self) -> Result<&MetaDataList> {
        let Some(ref meta) = self.meta else {
            if self.parsed.is_none() {
                return Err(Error::UnknownFormat);
            }
            if self.source.is_none() {
                return Err(Error::NotOpen);
            }
            // The title only exists inside the encrypted banner; without
            // it there is nothing canonical to report.
            let Some(info) = self.game_info() else {
                return Err(Error::MetadataUnavailable("encrypted banner is unreadable"));
            };
            let title = info.lines().next().unwrap_or("").to_owned();
            if title.is_empty() {
                return Err(Error::MetadataUnavailable("banner carries no title"));
            }
            return Ok(self.meta.insert(vec![(Property::Title, title)]));
        };
        Ok(meta)
    }

    fn close(&mut self) {
        #[cfg(feature = "crypto")]
        {
            self.reader = None;
        }
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(
        header_size: u32,
        kind: &[u8; 4],
        cert_chain_size: u32,
        ticket_size: u32,
        tmd_size: u32,
        data_size: u32,
    ) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0x00..0x04].copy_from_slice(&header_size.to_be_bytes());
        buf[0x04..0x08].copy_from_slice(kind);
        buf[0x08..0x0C].copy_from_slice(&cert_chain_size.to_be_bytes());
        buf[0x10..0x14].copy_from_slice(&ticket_size.to_be_bytes());
        buf[0x14..0x18].copy_from_slice(&tmd_size.to_be_bytes());
        buf[0x18..0x1C].copy_from_slice(&data_size.to_be_bytes());
        buf
    }

    fn probe<'a>(header: &'a [u8], file_size: u64) -> HeaderProbe<'a> {
        HeaderProbe {
            header,
            file_size,
            ext: None,
        }
    }

    fn good_header() -> [u8; HEADER_SIZE] {
        header_bytes(0x20, b"Is\0\0", 0x2A0, 0x2A4, 0x208, 0x3B0)
    }

    // Aligned: 0x40 + 0x2C0 + 0x2C0 + 0x240 = 0x800, + 0x40 content header.
    const GOOD_MIN_SIZE: u64 = 0x840;

    #[test]
    fn accepts_well_formed_header() {
        let header = good_header();
        assert!(matches(&probe(&header, GOOD_MIN_SIZE)));
        assert!(matches(&probe(&header, 0x10_0000)));
    }

    #[test]
    fn rejects_undersized_file() {
        let header = good_header();
        assert!(!matches(&probe(&header, GOOD_MIN_SIZE - 1)));
    }

    #[test]
    fn rejects_bad_header_size_field() {
        let header = header_bytes(0x1C, b"Is\0\0", 0x2A0, 0x2A4, 0x208, 0x3B0);
        assert!(!matches(&probe(&header, 0x10_0000)));
    }

    #[test]
    fn rejects_unknown_type() {
        let header = header_bytes(0x20, b"Xx\0\0", 0x2A0, 0x2A4, 0x208, 0x3B0);
        assert!(!matches(&probe(&header, 0x10_0000)));
        // All three accepted type values pass.
        for kind in [b"Is\0\0", b"ib\0\0", b"Bk\0\0"] {
            let header = header_bytes(0x20, kind, 0x2A0, 0x2A4, 0x208, 0x3B0);
            assert!(matches(&probe(&header, 0x10_0000)));
        }
    }

    #[test]
    fn rejects_small_ticket_or_tmd() {
        let header = header_bytes(0x20, b"Is\0\0", 0x2A0, 0x2A0, 0x208, 0x3B0);
        assert!(!matches(&probe(&header, 0x10_0000)));
        let header = header_bytes(0x20, b"Is\0\0", 0x2A0, 0x2A4, 0x1E0, 0x3B0);
        assert!(!matches(&probe(&header, 0x10_0000)));
    }

    #[test]
    fn rejects_short_probe() {
        let header = good_header();
        assert!(!matches(&probe(&header[..0x1C], 0x10_0000)));
        assert!(!matches(&probe(&[], 0x10_0000)));
    }

    #[test]
    fn section_offsets_are_aligned() {
        let header = WadHeader::parse(&good_header());
        assert_eq!(header.ticket_offset(), 0x40 + 0x2C0);
        assert_eq!(header.tmd_offset(), 0x40 + 0x2C0 + 0x2C0);
        assert_eq!(header.data_offset(), 0x800);
        assert_eq!(header.minimum_file_size(), GOOD_MIN_SIZE);
    }

    fn ticket_with(issuer: &[u8], index: u8) -> Ticket {
        let mut buf = [0u8; TICKET_SIZE];
        buf[0x140..0x140 + issuer.len()].copy_from_slice(issuer);
        buf[0x1F1] = index;
        Ticket::parse(&buf)
    }

    #[test]
    fn key_selection() {
        let retail_issuer = b"Root-CA00000001-XS00000003";
        assert_eq!(
            SystemKey::select(&ticket_with(retail_issuer, 0)),
            SystemKey::Retail
        );
        assert_eq!(
            SystemKey::select(&ticket_with(retail_issuer, 1)),
            SystemKey::Korean
        );
        assert_eq!(
            SystemKey::select(&ticket_with(retail_issuer, 2)),
            SystemKey::Vwii
        );
        // Out-of-range indices fall back to the retail key.
        assert_eq!(
            SystemKey::select(&ticket_with(retail_issuer, 3)),
            SystemKey::Retail
        );
        assert_eq!(
            SystemKey::select(&ticket_with(retail_issuer, 0xFF)),
            SystemKey::Retail
        );
        // Debug issuer wins regardless of the index byte.
        assert_eq!(
            SystemKey::select(&ticket_with(DEBUG_ISSUER, 1)),
            SystemKey::Debug
        );
    }

    fn tmd_with(title_id: u64, sys_version: u64, version: u16) -> TmdHeader {
        let mut buf = [0u8; TMD_HEADER_SIZE];
        buf[0x184..0x18C].copy_from_slice(&sys_version.to_be_bytes());
        buf[0x18C..0x194].copy_from_slice(&title_id.to_be_bytes());
        buf[0x1DC..0x1DE].copy_from_slice(&version.to_be_bytes());
        TmdHeader::parse(&buf)
    }

    #[test]
    fn game_id_requires_alphanumerics() {
        let tmd = tmd_with(0x0001_0001_5250_5345, 0, 0);
        assert_eq!(tmd.game_id().unwrap(), "RPSE");
        let tmd = tmd_with(0x0001_0001_5250_0045, 0, 0);
        assert!(tmd.game_id().is_none());
    }

    #[test]
    fn region_mapping() {
        assert_eq!(tmd_with(0x0001_0001_5250_5345, 0, 0).region(), "USA");
        assert_eq!(tmd_with(0x0001_0001_5250_534A, 0, 0).region(), "Japan");
        assert_eq!(tmd_with(0x0001_0001_5250_5350, 0, 0).region(), "Europe");
        assert_eq!(tmd_with(0x0001_0001_5250_5341, 0, 0).region(), "Region-Free");
        assert_eq!(
            tmd_with(0x0001_0001_5250_5361, 0, 0).region(),
            "Unknown (0x61)"
        );
        // IOS and System Menu titles carry no region character.
        assert_eq!(tmd_with(0x0000_0001_0000_0035, 0, 0).region(), "Region-Free");
    }

    #[test]
    fn ios_version_formatting() {
        let tmd = tmd_with(0, 0x0000_0001_0000_0035, 0);
        assert_eq!(tmd.ios_version().unwrap(), "IOS53");
        let tmd = tmd_with(0, 0, 0);
        assert!(tmd.ios_version().is_none());
        // Non-standard slots print the full title ID.
        let tmd = tmd_with(0, 0x0001_0008_0000_0100, 0);
        assert_eq!(tmd.ios_version().unwrap(), "00010008-00000100");
    }
}

//! Magic-byte content sniffing
//!
//! Classifies a byte prefix by its image signature. Only the first
//! [`SNIFF_LEN`] bytes are ever inspected; anything that is not a recognised
//! image is [`DetectedType::Unknown`].

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::{self, SeekFrom};

use imgdrop_core::constants::SNIFF_LEN;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// Content type detected from leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedType {
    Png,
    Jpeg,
    Gif,
    Webp,
    Unknown,
}

impl DetectedType {
    pub fn mime(&self) -> &'static str {
        match self {
            DetectedType::Png => "image/png",
            DetectedType::Jpeg => "image/jpeg",
            DetectedType::Gif => "image/gif",
            DetectedType::Webp => "image/webp",
            DetectedType::Unknown => "application/octet-stream",
        }
    }
}

impl Display for DetectedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.mime())
    }
}

/// Classify `data` by its leading bytes.
pub fn sniff(data: &[u8]) -> DetectedType {
    let data = &data[..data.len().min(SNIFF_LEN)];

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        return DetectedType::Png;
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return DetectedType::Jpeg;
    }

    // GIF: 47 49 46 38
    if data.starts_with(b"GIF8") {
        return DetectedType::Gif;
    }

    // WebP: RIFF ... WEBP
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return DetectedType::Webp;
    }

    DetectedType::Unknown
}

/// Read up to [`SNIFF_LEN`] bytes from `reader`, classify them and seek back to
/// the start so the caller can copy the full content, prefix included.
///
/// Returns the detected type together with the number of bytes inspected; zero
/// means the source was empty.
pub async fn sniff_and_rewind<R>(reader: &mut R) -> io::Result<(DetectedType, usize)>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let mut buf = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    let detected = sniff(&buf[..filled]);
    reader.seek(SeekFrom::Start(0)).await?;

    Ok((detected, filled))
}

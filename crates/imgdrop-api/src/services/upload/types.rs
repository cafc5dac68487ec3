//! Types used by the upload service

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Cursor;

use bytes::Bytes;
use imgdrop_processing::DetectedType;

/// One `file` part as read from the multipart body
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// Client-supplied filename; only used for the extension and in messages
    pub filename: String,
    pub data: Bytes,
}

/// A part whose content has been sniffed and accepted
///
/// `source` is positioned at offset 0 so the sniffed prefix is part of the copy.
#[derive(Debug)]
pub struct ValidatedFile {
    pub source: Cursor<Bytes>,
    pub filename: String,
    pub detected: DetectedType,
    pub extension: String,
}

/// Per-part progress through the pipeline. Any failure short-circuits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    SizeChecked,
    ContentValidated,
    Rewound,
    DirectoryEnsured,
    Written,
    Responded,
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            UploadStage::Received => "received",
            UploadStage::SizeChecked => "size_checked",
            UploadStage::ContentValidated => "content_validated",
            UploadStage::Rewound => "rewound",
            UploadStage::DirectoryEnsured => "directory_ensured",
            UploadStage::Written => "written",
            UploadStage::Responded => "responded",
        };
        f.write_str(name)
    }
}

use bytes::Bytes;
use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use reqwest::StatusCode;
use serde::Serialize;
use url::Url;

/// Character set a search page was decoded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Charset {
    Utf8,
    EucKr,
    Windows1252,
    ShiftJis,
    Gbk,
    Gb18030,
    Big5,
    Other(String),
}

/// Encodings with a dedicated variant. Result pages are mostly UTF-8, with
/// legacy Korean pages in EUC-KR.
fn named() -> [(&'static Encoding, Charset); 7] {
    [
        (encoding_rs::UTF_8, Charset::Utf8),
        (encoding_rs::EUC_KR, Charset::EucKr),
        (encoding_rs::WINDOWS_1252, Charset::Windows1252),
        (encoding_rs::SHIFT_JIS, Charset::ShiftJis),
        (encoding_rs::GBK, Charset::Gbk),
        (encoding_rs::GB18030, Charset::Gb18030),
        (encoding_rs::BIG5, Charset::Big5),
    ]
}

impl Charset {
    pub fn from_encoding(encoding: &'static Encoding) -> Self {
        named()
            .into_iter()
            .find(|(known, _)| *known == encoding)
            .map(|(_, charset)| charset)
            .unwrap_or_else(|| Self::Other(encoding.name().to_string()))
    }

    pub fn encoding(&self) -> &'static Encoding {
        if let Self::Other(name) = self {
            return Encoding::for_label(name.as_bytes()).unwrap_or(encoding_rs::UTF_8);
        }
        named()
            .into_iter()
            .find(|(_, charset)| charset == self)
            .map_or(encoding_rs::UTF_8, |(encoding, _)| encoding)
    }
}

/// A decoded search results page.
#[derive(Debug)]
pub struct SearchPage {
    pub url_final: Url,
    pub status: StatusCode,
    pub body_utf8: String,
    pub charset: Charset,
    pub fetched_at: DateTime<Utc>,
}

/// Raw bytes of one downloaded candidate.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub url_final: Url,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl ImagePayload {
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

use bytes::Bytes;
use encoding_rs::Encoding;
use reqwest::StatusCode;
use url::Url;

#[derive(Debug)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: StatusCode,
    pub body_raw: Bytes,
    pub body_utf8: String,
    pub encoding: &'static Encoding,
    /// Number of requests it took, including the successful one.
    pub attempts: u32,
}

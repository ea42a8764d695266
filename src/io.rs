use crate::codec::Utf8Transcoder;
use crate::{SheetError, SheetResult};
use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;

/// Where a raw sheet document came from and how its bytes are wrapped.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// e.g. "text/csv" or "application/gzip"
    pub content_type: String,
    /// e.g. "gzip", "zstd", or empty
    pub content_encoding: String,
    /// URL or file name, used for extension fallback and error context
    pub name_hint: String,
    /// Which character encoding to expect (defaults to UTF-8)
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            content_type: String::new(),
            content_encoding: String::new(),
            name_hint: String::new(),
            charset: encoding_rs::UTF_8,
        }
    }
}

impl SourceMeta {
    fn is_gzip(&self) -> bool {
        let ce = self.content_encoding.to_ascii_lowercase();
        let ct = self.content_type.to_ascii_lowercase();
        ce.split(',').any(|s| s.trim() == "gzip")
            || matches!(ct.as_str(), "application/gzip" | "application/x-gzip")
            || self.name_hint.ends_with(".gz")
    }

    fn is_zstd(&self) -> bool {
        let ce = self.content_encoding.to_ascii_lowercase();
        ce.split(',').any(|s| s.trim() == "zstd")
            || self.content_type.eq_ignore_ascii_case("application/zstd")
            || self.name_hint.ends_with(".zst")
    }
}

/// Wrap a raw byte source with decompression and UTF-8 transcoding as `meta` asks.
pub fn build_document_reader<R>(raw: R, meta: &SourceMeta) -> impl AsyncRead + Unpin + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buf = BufReader::with_capacity(1 << 16, raw);
    let decompressed: Box<dyn AsyncRead + Unpin + Send> = if meta.is_gzip() {
        Box::new(GzipDecoder::new(buf))
    } else if meta.is_zstd() {
        Box::new(ZstdDecoder::new(buf))
    } else {
        Box::new(buf)
    };

    // skip the transcoder entirely for UTF-8 input
    let reader: Box<dyn AsyncRead + Unpin + Send> = if meta.charset == encoding_rs::UTF_8 {
        decompressed
    } else {
        let framed = FramedRead::new(decompressed, Utf8Transcoder::new(meta.charset));
        Box::new(StreamReader::new(framed))
    };
    reader
}

/// Drain a document reader into a string.
pub async fn read_document<R>(mut reader: R, meta: &SourceMeta) -> SheetResult<String>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .await
        .map_err(|source| SheetError::io(&meta.name_hint, source))?;

    String::from_utf8(bytes).map_err(|e| {
        SheetError::io(
            &meta.name_hint,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })
}

/// Load a sheet document from a local `.csv`, `.csv.gz` or `.csv.zst` file.
pub async fn load_document(
    path: &Path,
    charset: &'static encoding_rs::Encoding,
) -> SheetResult<String> {
    let file = File::open(path)
        .await
        .map_err(|source| SheetError::io(path, source))?;

    let mut meta = SourceMeta {
        name_hint: path.display().to_string(),
        charset,
        ..Default::default()
    };
    match path.extension().and_then(|s| s.to_str()).unwrap_or_default() {
        "gz" => {
            meta.content_type = "application/gzip".into();
            meta.content_encoding = "gzip".into();
        }
        "zst" => {
            meta.content_type = "application/zstd".into();
            meta.content_encoding = "zstd".into();
        }
        _ => {
            meta.content_type = "text/csv".into();
        }
    }

    tracing::debug!(path = %path.display(), charset = charset.name(), "loading sheet");
    let reader = build_document_reader(file, &meta);
    read_document(reader, &meta).await
}

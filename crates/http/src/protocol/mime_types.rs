//! File extension to MIME type table, used to infer `Content-Type` for files.

use std::path::Path;

use mime::Mime;

use crate::protocol::UnknownExtension;

static MIME_TYPES: &[(&str, &str)] = &[
    ("3g2", "video/3gpp2"),
    ("3gp", "video/3gpp"),
    ("7z", "application/x-7z-compressed"),
    ("aac", "audio/aac"),
    ("abw", "application/x-abiword"),
    ("arc", "application/octet-stream"),
    ("avi", "video/x-msvideo"),
    ("azw", "application/vnd.amazon.ebook"),
    ("bin", "application/octet-stream"),
    ("bz", "application/x-bzip"),
    ("bz2", "application/x-bzip2"),
    ("csh", "application/x-csh"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("eot", "application/vnd.ms-fontobject"),
    ("epub", "application/epub+zip"),
    ("gif", "image/gif"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("ico", "image/x-icon"),
    ("ics", "text/calendar"),
    ("jar", "application/java-archive"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("mid", "audio/midi"),
    ("midi", "audio/midi"),
    ("mjs", "application/javascript"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("mpeg", "video/mpeg"),
    ("mpkg", "application/vnd.apple.installer+xml"),
    ("odp", "application/vnd.oasis.opendocument.presentation"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("oga", "audio/ogg"),
    ("ogv", "video/ogg"),
    ("ogx", "application/ogg"),
    ("otf", "font/otf"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("rar", "application/x-rar-compressed"),
    ("rtf", "application/rtf"),
    ("sh", "application/x-sh"),
    ("svg", "image/svg+xml"),
    ("swf", "application/x-shockwave-flash"),
    ("tar", "application/x-tar"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ts", "application/typescript"),
    ("ttf", "font/ttf"),
    ("txt", "text/plain"),
    ("vsd", "application/vnd.visio"),
    ("wasm", "application/wasm"),
    ("wav", "audio/x-wav"),
    ("weba", "audio/webm"),
    ("webm", "video/webm"),
    ("webp", "image/webp"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("xhtml", "application/xhtml+xml"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("xml", "application/xml"),
    ("xul", "application/vnd.mozilla.xul+xml"),
    ("zip", "application/zip"),
];

/// Looks up the MIME type of a file extension, with or without the leading dot.
///
/// # Errors
///
/// Returns [`UnknownExtension`] for extensions missing from the table. Callers
/// usually fall back to `application/octet-stream`, see [`from_path`].
pub fn from_extension(extension: &str) -> Result<&'static str, UnknownExtension> {
    let ext = extension.strip_prefix('.').unwrap_or(extension).to_ascii_lowercase();
    MIME_TYPES
        .binary_search_by_key(&ext.as_str(), |(e, _)| *e)
        .ok()
        .map(|index| MIME_TYPES[index].1)
        .ok_or_else(|| UnknownExtension(extension.to_string()))
}

/// Infers the MIME type of `path` from its extension.
pub fn from_path(path: &Path) -> Mime {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| from_extension(ext).ok())
        .and_then(|essence| essence.parse::<Mime>().ok())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        assert!(MIME_TYPES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn lookup_extension() {
        assert_eq!(from_extension("html"), Ok("text/html"));
        assert_eq!(from_extension(".css"), Ok("text/css"));
        assert_eq!(from_extension(".PNG"), Ok("image/png"));
        assert_eq!(from_extension(".unknown"), Err(UnknownExtension(".unknown".into())));
    }

    #[test]
    fn lookup_path() {
        assert_eq!(from_path(Path::new("public/app.js")).essence_str(), "application/javascript");
        assert_eq!(from_path(Path::new("public/data.qqq")), mime::APPLICATION_OCTET_STREAM);
        assert_eq!(from_path(Path::new("Makefile")), mime::APPLICATION_OCTET_STREAM);
    }
}

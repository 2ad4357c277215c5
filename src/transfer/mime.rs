//! Extension to content-type mapping for published files.

use std::path::Path;

/// Fallback for unrecognized or missing extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Classify a file by extension, case-insensitively.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return OCTET_STREAM,
    };

    match ext.as_str() {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(content_type_for(Path::new("index.html")), "text/html");
        assert_eq!(content_type_for(Path::new("data.json")), "application/json");
        assert_eq!(content_type_for(Path::new("logo.png")), "image/png");
        assert_eq!(content_type_for(Path::new("photo.JPEG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a/b/site.css")), "text/css");
    }

    #[test]
    fn unknown_or_missing_extension_falls_back_to_octet_stream() {
        assert_eq!(content_type_for(Path::new("archive.tar.zst")), OCTET_STREAM);
        assert_eq!(content_type_for(Path::new("LICENSE")), OCTET_STREAM);
        assert_eq!(content_type_for(Path::new(".env")), OCTET_STREAM);
    }
}

/// Infer a content type from a file-name extension (spec §4.3 "content type
/// is inferred by file-name extension"). Deliberately small: MIME detection
/// proper is named out of scope in spec §1 ("MIME-type detection" is an
/// external collaborator); this covers the common cases a passthrough mount
/// needs without a dependency on a sniffing crate.
pub fn infer(name: &str) -> Option<String> {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
    let mime = match ext.as_str() {
        "txt" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "js" => "text/javascript",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "wav" => "audio/wav",
        _ => return None,
    };
    Some(mime.to_string())
}

//! HTTP server mode for pdf2docx.
//!
//! Accepts PDF uploads and answers with the converted DOCX, via `pdf2docx --serve`.

use std::io::Read;

use anyhow::Result;
use pdf2docx::config::Format;
use serde_json::json;
use tiny_http::Method;
use tracing::{info, warn};

use crate::multipart;

/// Largest accepted request body.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Form field that carries the PDF.
const UPLOAD_FIELD: &str = "pdf";

/// Start the HTTP server on the given host and port.
pub fn start_server(host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let server = tiny_http::Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("failed to bind to {addr}: {e}"))?;

    info!("pdf2docx server listening on http://{addr}");
    info!("  POST /convert (or /api/convert) - Convert an uploaded PDF to DOCX");
    info!("  GET  /health                    - Health check");
    info!("  GET  /formats                   - List supported formats");

    for mut request in server.incoming_requests() {
        let reply = dispatch(&mut request);
        if let Err(e) = request.respond(reply.into_response()) {
            warn!("failed to send response: {e}");
        }
    }

    Ok(())
}

/// A response before it is handed to tiny_http.
#[derive(Debug)]
struct Reply {
    status: u16,
    content_type: &'static str,
    attachment: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            attachment: None,
            body: value.to_string().into_bytes(),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    fn docx(filename: String, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: Format::Docx.mime_type(),
            attachment: Some(filename),
            body,
        }
    }

    fn into_response(self) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
        let mut response = tiny_http::Response::from_data(self.body).with_status_code(self.status);
        let disposition = self
            .attachment
            .map(|name| format!("attachment; filename=\"{name}\""));
        let headers = [
            ("Content-Type", Some(self.content_type.to_string())),
            ("Content-Disposition", disposition),
        ];
        for (field, value) in headers {
            let Some(value) = value else { continue };
            match tiny_http::Header::from_bytes(field, value) {
                Ok(header) => response.add_header(header),
                Err(()) => warn!("dropping invalid {field} header"),
            }
        }
        response
    }
}

fn dispatch(request: &mut tiny_http::Request) -> Reply {
    let method = request.method().clone();
    let url = request.url().to_string();
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string())
        .unwrap_or_default();
    let declared_len = request.body_length();

    let reply = route(
        &method,
        &url,
        &content_type,
        request.as_reader(),
        declared_len,
    );
    info!(%method, %url, status = reply.status, "handled request");
    reply
}

fn route(
    method: &Method,
    url: &str,
    content_type: &str,
    body: impl Read,
    declared_len: Option<usize>,
) -> Reply {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        (Method::Get, "/health") => Reply::json(
            200,
            json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }),
        ),
        (Method::Get, "/formats") => Reply::json(
            200,
            json!({
                "input": [Format::Pdf.extension()],
                "output": [Format::Docx.extension()],
            }),
        ),
        (Method::Post, "/convert" | "/api/convert") => match read_body(body, declared_len) {
            Ok(body) => convert_upload(content_type, &body),
            Err(reply) => reply,
        },
        _ => Reply::error(404, "not found"),
    }
}

/// Read the request body, refusing anything over [`MAX_UPLOAD_BYTES`].
fn read_body(body: impl Read, declared_len: Option<usize>) -> Result<Vec<u8>, Reply> {
    let too_large = || {
        Reply::error(
            413,
            &format!("upload exceeds the {} MB limit", MAX_UPLOAD_BYTES / (1024 * 1024)),
        )
    };
    if declared_len.is_some_and(|len| len > MAX_UPLOAD_BYTES) {
        return Err(too_large());
    }

    let mut data = Vec::new();
    body.take(MAX_UPLOAD_BYTES as u64 + 1)
        .read_to_end(&mut data)
        .map_err(|e| Reply::error(400, &format!("failed to read request body: {e}")))?;
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(too_large());
    }
    Ok(data)
}

fn convert_upload(content_type: &str, body: &[u8]) -> Reply {
    let Some(boundary) = multipart::boundary(content_type) else {
        return Reply::error(400, "expected multipart/form-data with a boundary");
    };
    let parts = multipart::parts(body, &boundary);
    let Some(upload) = multipart::file_part(&parts, UPLOAD_FIELD) else {
        return Reply::error(
            400,
            &format!("no file in form (expected field \"{UPLOAD_FIELD}\")"),
        );
    };
    let filename = upload.filename.as_deref().unwrap_or_default();

    info!("Converting upload {filename} ({} bytes)", upload.data.len());
    match pdf2docx::Converter::from_bytes(upload.data, filename).and_then(|c| c.to_docx()) {
        Ok(result) => {
            for warning in &result.warnings {
                warn!("{filename}: {warning}");
            }
            Reply::docx(download_name(filename), result.docx)
        }
        Err(e) => {
            warn!("Conversion failed: {e}");
            Reply::error(400, &format!("conversion failed: {e}"))
        }
    }
}

/// Name of the converted download: the upload's base name with a `.docx` extension.
fn download_name(upload: &str) -> String {
    let base = upload.rsplit(['/', '\\']).next().unwrap_or(upload);
    let stem = match base.rsplit_once('.') {
        Some((stem, ext)) if Format::from_extension(ext) == Some(Format::Pdf) => stem,
        _ => base,
    };
    let stem: String = stem
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let stem = if stem.is_empty() { "document" } else { &stem };
    format!("{stem}.{}", Format::Docx.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf2docx::fixtures::pdf_with_pages;

    const BOUNDARY: &str = "XyZ";

    fn multipart_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    /// Form body with a leading text field, then the file under `field`.
    fn upload_form(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nquarterly\r\n\
             --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn post(path: &str, content_type: &str, body: &[u8]) -> Reply {
        route(&Method::Post, path, content_type, body, Some(body.len()))
    }

    fn get(path: &str) -> Reply {
        route(&Method::Get, path, "", std::io::empty(), None)
    }

    fn body_json(reply: &Reply) -> serde_json::Value {
        serde_json::from_slice(&reply.body).expect("body should be valid JSON")
    }

    #[test]
    fn test_health_reports_version() {
        let reply = get("/health");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "application/json");
        let body = body_json(&reply);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_formats_lists_pdf_to_docx() {
        let body = body_json(&get("/formats"));
        assert_eq!(body, json!({ "input": ["pdf"], "output": ["docx"] }));
    }

    #[test]
    fn test_unknown_route_is_not_found() {
        let reply = get("/nonexistent");
        assert_eq!(reply.status, 404);
        assert_eq!(body_json(&reply)["error"], "not found");
        assert_eq!(get("/convert").status, 404, "GET on the upload route");
    }

    #[test]
    fn test_error_body_escapes_control_characters() {
        let reply = Reply::error(400, "line1\nline2\t\"quoted\"\u{1}");
        let body = body_json(&reply);
        assert_eq!(body["error"], "line1\nline2\t\"quoted\"\u{1}");
    }

    #[test]
    fn test_convert_finds_file_after_text_field() {
        let pdf = pdf_with_pages(&["Hello server"]).unwrap();
        let reply = post(
            "/convert",
            &multipart_type(),
            &upload_form("pdf", "greeting.pdf", &pdf),
        );
        assert_eq!(reply.status, 200, "{}", String::from_utf8_lossy(&reply.body));
        assert_eq!(reply.content_type, Format::Docx.mime_type());
        assert_eq!(reply.attachment.as_deref(), Some("greeting.docx"));
        assert!(reply.body.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn test_legacy_api_route_is_accepted() {
        let pdf = pdf_with_pages(&["Legacy"]).unwrap();
        let reply = post(
            "/api/convert?lang=en",
            &multipart_type(),
            &upload_form("pdf", "old.pdf", &pdf),
        );
        assert_eq!(reply.status, 200);
    }

    #[test]
    fn test_convert_rejects_non_pdf_upload() {
        let reply = post(
            "/convert",
            &multipart_type(),
            &upload_form("pdf", "fake.pdf", b"not a document"),
        );
        assert_eq!(reply.status, 400);
        let error = body_json(&reply)["error"].as_str().unwrap().to_string();
        assert!(error.contains("not a PDF file: fake.pdf"), "{error}");
    }

    #[test]
    fn test_convert_without_boundary_is_bad_request() {
        let pdf = pdf_with_pages(&["Raw"]).unwrap();
        let reply = post("/convert", "application/pdf", &pdf);
        assert_eq!(reply.status, 400);
        assert!(body_json(&reply)["error"].as_str().unwrap().contains("boundary"));
    }

    #[test]
    fn test_convert_without_file_part_is_bad_request() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhi\r\n--{BOUNDARY}--\r\n"
        );
        let reply = post("/convert", &multipart_type(), body.as_bytes());
        assert_eq!(reply.status, 400);
        assert!(body_json(&reply)["error"].as_str().unwrap().contains("\"pdf\""));
    }

    #[test]
    fn test_declared_oversized_upload_is_rejected_unread() {
        let reply = route(
            &Method::Post,
            "/convert",
            &multipart_type(),
            std::io::empty(),
            Some(MAX_UPLOAD_BYTES + 1),
        );
        assert_eq!(reply.status, 413);
        assert!(body_json(&reply)["error"].as_str().unwrap().contains("25 MB"));
    }

    #[test]
    fn test_undeclared_oversized_body_is_cut_off() {
        let endless = std::io::repeat(b'x');
        let reply = route(&Method::Post, "/convert", &multipart_type(), endless, None);
        assert_eq!(reply.status, 413);
    }

    #[test]
    fn test_read_body_accepts_limit_exactly() {
        let body = read_body(std::io::repeat(0).take(MAX_UPLOAD_BYTES as u64), None).unwrap();
        assert_eq!(body.len(), MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name("report.pdf"), "report.docx");
        assert_eq!(download_name("REPORT.PDF"), "REPORT.docx");
        assert_eq!(download_name("C:\\scans\\invoice.pdf"), "invoice.docx");
        assert_eq!(download_name("notes"), "notes.docx");
        assert_eq!(download_name("archive.tar"), "archive.tar.docx");
        assert_eq!(download_name("we\"ird.pdf"), "weird.docx");
        assert_eq!(download_name(".pdf"), "document.docx");
        assert_eq!(download_name(""), "document.docx");
    }

    #[test]
    fn test_reply_headers_reach_tiny_http() {
        let response = Reply::docx("a.docx".to_string(), vec![1, 2]).into_response();
        assert_eq!(response.status_code().0, 200);
        let header = |name: &str| {
            response
                .headers()
                .iter()
                .find(|h| h.field.equiv(name))
                .map(|h| h.value.as_str().to_string())
        };
        assert_eq!(
            header("Content-Disposition").as_deref(),
            Some("attachment; filename=\"a.docx\"")
        );
        assert_eq!(
            header("Content-Type").as_deref(),
            Some(Format::Docx.mime_type())
        );
    }

    #[test]
    fn test_server_answers_over_tcp() {
        use std::io::Write;

        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = std::thread::spawn(move || {
            let mut request = server.recv().unwrap();
            let reply = dispatch(&mut request);
            request.respond(reply.into_response()).unwrap();
        });

        let mut stream = std::net::TcpStream::connect(addr).unwrap();
        write!(
            stream,
            "GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).unwrap();
        handle.join().unwrap();

        assert!(raw.starts_with("HTTP/1.1 200"), "{raw}");
        assert!(raw.ends_with(&json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }).to_string()));
    }
}

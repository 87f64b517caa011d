//! Minimal `multipart/form-data` reader for the upload endpoint.

/// One form part: its disposition parameters and raw content.
#[derive(Debug, PartialEq, Eq)]
pub struct Part<'a> {
    pub name: Option<String>,
    pub filename: Option<String>,
    pub data: &'a [u8],
}

/// The `boundary` parameter of a `multipart/form-data` content type.
pub fn boundary(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';');
    let mime = params.next()?.trim();
    if !mime.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    params
        .find_map(|param| header_param(param, "boundary"))
        .filter(|b| !b.is_empty())
}

/// Split a form body into its parts, in order.
///
/// Parts without a `Content-Disposition` header are skipped. Anything after the
/// closing delimiter is ignored, as is a body with no closing delimiter.
pub fn parts<'a>(body: &'a [u8], boundary: &str) -> Vec<Part<'a>> {
    let opening = format!("--{boundary}");
    let separator = format!("\r\n--{boundary}");

    let mut parts = Vec::new();
    let Some(first) = position(body, opening.as_bytes()) else {
        return parts;
    };
    let mut rest = &body[first + opening.len()..];

    // After each delimiter: "--" closes the form, CRLF starts another part.
    while let Some(section) = rest.strip_prefix(b"\r\n") {
        let Some(end) = position(section, separator.as_bytes()) else {
            break;
        };
        if let Some(part) = parse_part(&section[..end]) {
            parts.push(part);
        }
        rest = &section[end + separator.len()..];
    }
    parts
}

/// The part carrying the upload: the file in field `field`, else the first file part.
pub fn file_part<'p, 'a>(parts: &'p [Part<'a>], field: &str) -> Option<&'p Part<'a>> {
    let is_file = |part: &&Part<'_>| part.filename.is_some();
    parts
        .iter()
        .filter(is_file)
        .find(|part| part.name.as_deref() == Some(field))
        .or_else(|| parts.iter().find(is_file))
}

fn parse_part(section: &[u8]) -> Option<Part<'_>> {
    let (headers, data) = if let Some(data) = section.strip_prefix(b"\r\n") {
        // No part headers at all
        (&b""[..], data)
    } else {
        let split = position(section, b"\r\n\r\n")?;
        (&section[..split], &section[split + 4..])
    };
    let headers = std::str::from_utf8(headers).ok()?;

    let disposition = headers.split("\r\n").find_map(|line| {
        let (field, value) = line.split_once(':')?;
        field
            .trim()
            .eq_ignore_ascii_case("content-disposition")
            .then_some(value)
    })?;

    Some(Part {
        name: disposition
            .split(';')
            .find_map(|param| header_param(param, "name")),
        filename: disposition
            .split(';')
            .find_map(|param| header_param(param, "filename")),
        data,
    })
}

/// Value of `key=value` or `key="value"`, if `param` has that key.
fn header_param(param: &str, key: &str) -> Option<String> {
    let (k, v) = param.split_once('=')?;
    k.trim()
        .eq_ignore_ascii_case(key)
        .then(|| v.trim().trim_matches('"').to_string())
}

fn position(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

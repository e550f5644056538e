//! `multipart/form-data` decoding for the upload endpoint.
//!
//! Only what a browser form with one file input and a few text inputs sends:
//! parts are delimited by the boundary, each carries a `Content-Disposition`
//! header with a `name` and optionally a `filename`.

use pageforge_shared::{PageForgeError, Result};

/// One decoded form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    /// Present when the part is a file upload.
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// All fields of a submitted form, in body order.
#[derive(Debug, Clone, Default)]
pub struct Form {
    parts: Vec<Part>,
}

impl Form {
    /// The first part named `name`.
    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// A text field's value, decoded lossily.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(|p| String::from_utf8_lossy(&p.data).into_owned())
    }
}

/// The `boundary` parameter of a `multipart/form-data` content type.
pub fn boundary(content_type: &str) -> Option<&str> {
    let (mime, params) = content_type.split_once(';')?;
    if !mime.trim().eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }

    params
        .split(';')
        .find_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("boundary")
                .then(|| value.trim().trim_matches('"'))
        })
        .filter(|b| !b.is_empty())
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Decode a form body.
///
/// Parts without a `name` are skipped. A body with no opening delimiter or a
/// part that never reaches the next delimiter is a parse error.
pub fn parse(body: &[u8], boundary: &str) -> Result<Form> {
    let delimiter = format!("--{boundary}").into_bytes();
    let next_delimiter = format!("\r\n--{boundary}").into_bytes();

    let mut pos = find(body, &delimiter, 0)
        .ok_or_else(|| PageForgeError::parse("multipart body has no opening boundary"))?
        + delimiter.len();
    let mut parts = Vec::new();

    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            break;
        }
        if rest.starts_with(b"\r\n") {
            pos += 2;
        }

        let header_end = find(body, b"\r\n\r\n", pos)
            .ok_or_else(|| PageForgeError::parse("multipart part has no header terminator"))?;
        let headers = String::from_utf8_lossy(&body[pos..header_end]);
        let data_start = header_end + 4;

        let data_end = find(body, &next_delimiter, data_start)
            .ok_or_else(|| PageForgeError::parse("multipart body is not terminated"))?;

        if let Some((name, filename)) = disposition(&headers) {
            parts.push(Part {
                name,
                filename,
                data: body[data_start..data_end].to_vec(),
            });
        }

        pos = data_end + next_delimiter.len();
    }

    Ok(Form { parts })
}

/// `name` and `filename` from the part's `Content-Disposition` header.
fn disposition(headers: &str) -> Option<(String, Option<String>)> {
    let line = headers.lines().find(|l| {
        l.split_once(':')
            .is_some_and(|(k, _)| k.trim().eq_ignore_ascii_case("content-disposition"))
    })?;
    let (_, value) = line.split_once(':')?;

    let mut name = None;
    let mut filename = None;
    for param in value.split(';').skip(1) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let raw = raw.trim().trim_matches('"').to_string();
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => name = Some(raw),
            "filename" => filename = Some(raw),
            _ => {}
        }
    }

    Some((name?, filename))
}

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A parsed email message. MIME parsing happens upstream; the scanner only
/// reads this structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    /// Header fields in wire order.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// A message with no headers, bodies, or attachments cannot be
    /// interpreted and is rejected with `ScanError::Parse`.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
            && self.subject.is_none()
            && self.text.is_none()
            && self.html.is_none()
            && self.attachments.is_empty()
    }

    /// First header value matching `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Domain claimed by the From header, e.g. `"Ann <ann@example.com>"`
    /// yields `example.com`.
    pub fn sender_domain(&self) -> Option<String> {
        let from = self.header("From")?;
        let at_pos = from.rfind('@')?;
        let domain_part = &from[at_pos + 1..];
        let end = domain_part.find('>').unwrap_or(domain_part.len());
        let domain = domain_part[..end].trim().to_lowercase();
        if domain.is_empty() {
            None
        } else {
            Some(domain)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: AttachmentContent,
}

/// Attachment payload: raw bytes, or a base64 body still carrying its
/// transfer encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttachmentContent {
    Base64(String),
    Bytes(Vec<u8>),
}

impl Attachment {
    pub fn from_bytes(filename: Option<&str>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.map(str::to_string),
            content_type: None,
            content: AttachmentContent::Bytes(content),
        }
    }

    pub fn from_base64(filename: Option<&str>, encoded: &str) -> Self {
        Self {
            filename: filename.map(str::to_string),
            content_type: None,
            content: AttachmentContent::Base64(encoded.to_string()),
        }
    }

    /// Decoded payload bytes. Base64 bodies may contain line breaks from the
    /// transfer encoding; whitespace is stripped before decoding.
    pub fn decoded(&self) -> Result<Cow<'_, [u8]>, String> {
        match &self.content {
            AttachmentContent::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            AttachmentContent::Base64(encoded) => {
                let compact: String =
                    encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                BASE64_STANDARD
                    .decode(compact.as_bytes())
                    .map(Cow::Owned)
                    .map_err(|e| e.to_string())
            }
        }
    }
}

/// Partial content input for the standalone detector entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentInput<'a> {
    pub text: Option<&'a str>,
    pub html: Option<&'a str>,
}

impl<'a> ContentInput<'a> {
    pub fn from_message(message: &'a Message) -> Self {
        Self {
            text: message.text.as_deref(),
            html: message.html.as_deref(),
        }
    }
}

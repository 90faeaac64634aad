//! In-memory file attachments
//!
//! An attachment can stand in for a real file anywhere a filename is
//! accepted, using the URL returned when it is registered.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::validation::{Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Streamable, WireSink};

/// URL scheme prefix of attachment references
pub const ATTACHMENT_PREFIX: &str = "attachment:/";

const ATTACHMENT_KEY: &str = "attachment";
const ATTACHMENT_END_KEY: &str = "attachment_end";

/// Whether a filename refers to an attachment rather than a disk file
pub fn is_attachment_url(value: &str) -> bool {
    value.starts_with(ATTACHMENT_PREFIX)
}

/// Bytes escaped in attachment URLs: all but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a filename for use inside an attachment URL
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, URL_COMPONENT).to_string()
}

/// Attachment payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentContent {
    Text(String),
    Binary(Vec<u8>),
}

impl AttachmentContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AttachmentContent::Text(text) => text.as_bytes(),
            AttachmentContent::Binary(bytes) => bytes,
        }
    }
}

/// Named payload registered on a job
///
/// Read-only once added; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    content: AttachmentContent,
    url: String,
}

impl Attachment {
    pub(crate) fn new(index: usize, filename: &str, content: AttachmentContent) -> Self {
        Self {
            url: format!("{}{}/{}", ATTACHMENT_PREFIX, index, percent_encode(filename)),
            filename: filename.to_string(),
            content,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content(&self) -> &AttachmentContent {
        &self.content
    }

    /// Reference usable in place of a filename
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Validate for Attachment {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("filename", Some(&self.filename));
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("Attachment({})", self.filename))
    }
}

impl Streamable for Attachment {
    fn stream(&self, sink: &mut dyn WireSink) {
        sink.write_line(ATTACHMENT_KEY);
        match &self.content {
            AttachmentContent::Text(_) => sink.write_line(&self.filename),
            AttachmentContent::Binary(bytes) => {
                sink.write_line(&format!("{}|{}", self.filename, bytes.len()))
            },
        }
        sink.write_bytes(self.content.as_bytes());
        sink.write_bytes(b"\n");
        sink.write_line(ATTACHMENT_END_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("fuel map (v2).asc"), "fuel%20map%20(v2).asc");
        assert_eq!(percent_encode("a/b|c"), "a%2Fb%7Cc");
        assert_eq!(percent_encode("é"), "%C3%A9");
        assert_eq!(percent_encode("it's-a_b.c!~*"), "it's-a_b.c!~*");
        assert_eq!(percent_encode("50%+1"), "50%25%2B1");
    }

    #[test]
    fn test_url() {
        let a = Attachment::new(3, "elev data.tif", AttachmentContent::Binary(vec![1, 2]));
        assert_eq!(a.url(), "attachment:/3/elev%20data.tif");
        assert!(is_attachment_url(a.url()));
    }

    #[test]
    fn test_stream_text_and_binary() {
        let mut out = Vec::new();
        Attachment::new(0, "a.prj", AttachmentContent::Text("PROJ".into())).stream(&mut out);
        Attachment::new(1, "b.bin", AttachmentContent::Binary(vec![0xff, 0x00])).stream(&mut out);

        let mut expected = b"attachment\na.prj\nPROJ\nattachment_end\n".to_vec();
        expected.extend_from_slice(b"attachment\nb.bin|2\n");
        expected.extend_from_slice(&[0xff, 0x00]);
        expected.extend_from_slice(b"\nattachment_end\n");
        assert_eq!(out, expected);
    }
}

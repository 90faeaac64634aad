//! Line-oriented wire encoding
//!
//! Every message is two lines: a key token and a value. Compound values are
//! `|`-joined records whose field order is fixed per entity type.

use tracing::trace;

/// Connection handshake token
pub const STARTUP: &str = "STARTUP";
/// Closes the conversation
pub const SHUTDOWN: &str = "SHUTDOWN";
/// Opens the job data section
pub const BEGINDATA: &str = "BEGINDATA";
/// Closes the job data section
pub const ENDDATA: &str = "ENDDATA";
/// Asks the builder to queue the job
pub const STARTJOB: &str = "STARTJOB";
/// Key of the job-wide comment message
pub const GLOBALCOMMENTS: &str = "GLOBALCOMMENTS";

/// Token for an absent string inside a record
pub const NULL: &str = "null";
/// Token for an absent number or enumeration inside a record
pub const UNSET_NUMBER: &str = "-1";

/// Destination for encoded bytes
pub trait WireSink {
    /// Write one line followed by `\n`
    fn write_line(&mut self, line: &str);

    /// Write a key/value message pair
    fn write_message(&mut self, key: &str, value: &str) {
        self.write_line(key);
        self.write_line(value);
    }

    /// Write raw bytes with no terminator
    fn write_bytes(&mut self, bytes: &[u8]);
}

impl WireSink for Vec<u8> {
    fn write_line(&mut self, line: &str) {
        self.extend_from_slice(line.as_bytes());
        self.push(b'\n');
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Byte buffer that counts the messages written to it
#[derive(Debug, Default, Clone)]
pub struct WireBuffer {
    bytes: Vec<u8>,
    messages: usize,
}

impl WireBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> usize {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Lines of the buffer, lossily decoded
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl WireSink for WireBuffer {
    fn write_line(&mut self, line: &str) {
        self.bytes.write_line(line);
    }

    fn write_message(&mut self, key: &str, value: &str) {
        trace!(key, "wire message");
        self.messages += 1;
        self.bytes.write_line(key);
        self.bytes.write_line(value);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.write_bytes(bytes);
    }
}

/// Something that can encode itself onto the wire
pub trait Streamable {
    fn stream(&self, sink: &mut dyn WireSink);
}

/// Shortest decimal form of a number (`2`, `0.5`, `-1`)
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // drop the sign of negative zero
        return "0".to_string();
    }
    format!("{}", value)
}

/// Replace characters that would break a record or a line with spaces
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '|' | '\r' | '\n' => ' ',
            other => other,
        })
        .collect()
}

/// Builder for a `|`-joined record
#[derive(Debug, Default, Clone)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field written verbatim (identifiers, paths, pre-joined sub-records)
    pub fn raw(mut self, value: impl Into<String>) -> Self {
        self.fields.push(value.into());
        self
    }

    /// Free text with delimiters replaced
    pub fn text(self, value: &str) -> Self {
        let clean = sanitize_text(value);
        self.raw(clean)
    }

    /// Optional string, `null` when absent or empty
    pub fn opt_str(self, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.raw(v),
            _ => self.raw(NULL),
        }
    }

    pub fn num(self, value: f64) -> Self {
        self.raw(format_number(value))
    }

    /// Optional number, `-1` when absent
    pub fn opt_num(self, value: Option<f64>) -> Self {
        match value {
            Some(v) => self.num(v),
            None => self.raw(UNSET_NUMBER),
        }
    }

    pub fn int(self, value: i64) -> Self {
        self.raw(value.to_string())
    }

    /// Optional integer, `-1` when absent
    pub fn opt_int(self, value: Option<i32>) -> Self {
        match value {
            Some(v) => self.int(i64::from(v)),
            None => self.raw(UNSET_NUMBER),
        }
    }

    pub fn bool(self, value: bool) -> Self {
        self.raw(if value { "true" } else { "false" })
    }

    /// Optional boolean, `null` when absent
    pub fn opt_bool(self, value: Option<bool>) -> Self {
        match value {
            Some(v) => self.bool(v),
            None => self.raw(NULL),
        }
    }

    /// Enumeration code
    pub fn code(self, code: i32) -> Self {
        self.int(i64::from(code))
    }

    /// Optional enumeration code, `-1` when absent
    pub fn opt_code(self, code: Option<i32>) -> Self {
        self.opt_int(code)
    }

    /// Element count followed by the elements' own fields
    pub fn list<T>(mut self, items: &[T], each: impl Fn(Record, &T) -> Record) -> Self {
        self = self.int(items.len() as i64);
        for item in items {
            self = each(self, item);
        }
        self
    }

    pub fn build(&self) -> String {
        self.fields.join("|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_format() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-1.0), "-1");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.0000001), "0.0000001");
    }

    #[test]
    fn test_record_sentinels() {
        let value = Record::new()
            .raw("id1")
            .opt_str(None)
            .opt_num(None)
            .opt_bool(None)
            .opt_code(Some(3))
            .text("a|b\nc")
            .build();
        assert_eq!(value, "id1|null|-1|null|3|a b c");
    }

    #[test]
    fn test_record_list() {
        let value = Record::new()
            .raw("x")
            .list(&["a", "b"], |r, s| r.raw(*s))
            .build();
        assert_eq!(value, "x|2|a|b");
    }

    #[test]
    fn test_wire_buffer_counts_messages() {
        let mut buf = WireBuffer::new();
        buf.write_line(STARTUP);
        buf.write_message("timezone_id", "12");
        buf.write_message("projfile", "a.prj");
        assert_eq!(buf.messages(), 2);
        assert_eq!(buf.lines(), vec!["STARTUP", "timezone_id", "12", "projfile", "a.prj"]);
    }
}

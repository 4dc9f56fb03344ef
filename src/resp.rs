//! # RESP2 Wire Driver
//!
//! Purpose: Frame outgoing commands and parse server replies. This is the
//! lowest layer; it never interprets command semantics.
//!
//! ## Design Principles
//! 1. **State-Free Parsing**: Replies are parsed top-down with minimal state.
//! 2. **Buffer Reuse**: Caller provides buffers to avoid per-call allocations.
//! 3. **Binary-Safe**: Bulk strings are treated as raw bytes.
//! 4. **Fail Fast**: Invalid framing returns protocol errors immediately.

use std::io::BufRead;

use crate::error::{Error, Result};

/// One parsed server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// +OK or +PONG style replies.
    Simple(Vec<u8>),
    /// -ERR ... replies.
    Error(Vec<u8>),
    /// :123 replies.
    Integer(i64),
    /// $... bulk strings, None for the null bulk.
    Bulk(Option<Vec<u8>>),
    /// *... arrays (HGETALL, SMEMBERS, KEYS and friends).
    Array(Vec<Reply>),
}

impl Reply {
    /// Discards the payload, keeping only success or server error.
    pub fn ok(self) -> Result<()> {
        match self {
            Reply::Error(message) => Err(server_error(message)),
            _ => Ok(()),
        }
    }

    /// Interprets the reply as an integer count or flag.
    pub fn integer(self) -> Result<i64> {
        match self {
            Reply::Integer(value) => Ok(value),
            Reply::Error(message) => Err(server_error(message)),
            _ => Err(Error::UnexpectedReply),
        }
    }

    /// Interprets the reply as an optional byte payload.
    pub fn bytes(self) -> Result<Option<Vec<u8>>> {
        match self {
            Reply::Bulk(data) => Ok(data),
            Reply::Simple(text) => Ok(Some(text)),
            Reply::Error(message) => Err(server_error(message)),
            _ => Err(Error::UnexpectedReply),
        }
    }

    /// Interprets the reply as a sequence of byte payloads, preserving the
    /// server's element order. Null bulks become empty payloads.
    pub fn items(self) -> Result<Vec<Vec<u8>>> {
        let elements = match self {
            Reply::Array(elements) => elements,
            Reply::Error(message) => return Err(server_error(message)),
            _ => return Err(Error::UnexpectedReply),
        };
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                Reply::Bulk(Some(data)) => items.push(data),
                Reply::Bulk(None) => items.push(Vec::new()),
                Reply::Simple(text) => items.push(text),
                _ => return Err(Error::UnexpectedReply),
            }
        }
        Ok(items)
    }

    /// Interprets the reply as a sequence of UTF-8 strings.
    pub fn strings(self) -> Result<Vec<String>> {
        let items = self.items()?;
        Ok(items
            .into_iter()
            .map(|item| String::from_utf8_lossy(&item).into_owned())
            .collect())
    }

    /// Interprets a flat field/value array (HGETALL shape) as pairs.
    pub fn pairs(self) -> Result<Vec<(String, Vec<u8>)>> {
        let items = self.items()?;
        if items.len() % 2 != 0 {
            return Err(Error::UnexpectedReply);
        }
        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
            pairs.push((String::from_utf8_lossy(&field).into_owned(), value));
        }
        Ok(pairs)
    }
}

fn server_error(message: Vec<u8>) -> Error {
    Error::Server(String::from_utf8_lossy(&message).into_owned())
}

/// Encodes a command as a RESP2 array of bulk strings into `out`.
pub fn encode_command(args: &[&[u8]], out: &mut Vec<u8>) {
    out.push(b'*');
    out.extend_from_slice(args.len().to_string().as_bytes());
    out.extend_from_slice(b"\r\n");
    for arg in args {
        out.push(b'$');
        out.extend_from_slice(arg.len().to_string().as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(arg);
        out.extend_from_slice(b"\r\n");
    }
}

/// Reads one reply from the buffered reader.
pub fn read_reply<R: BufRead>(reader: &mut R, line_buf: &mut Vec<u8>) -> Result<Reply> {
    read_line(reader, line_buf)?;
    if line_buf.is_empty() {
        return Err(Error::Protocol);
    }

    match line_buf[0] {
        b'+' => Ok(Reply::Simple(line_buf[1..].to_vec())),
        b'-' => Ok(Reply::Error(line_buf[1..].to_vec())),
        b':' => Ok(Reply::Integer(parse_i64(&line_buf[1..])?)),
        b'$' => {
            let len = parse_i64(&line_buf[1..])?;
            read_bulk(reader, len)
        }
        b'*' => {
            let len = parse_i64(&line_buf[1..])?;
            read_array(reader, len, line_buf)
        }
        _ => Err(Error::Protocol),
    }
}

fn read_bulk<R: BufRead>(reader: &mut R, len: i64) -> Result<Reply> {
    if len < 0 {
        return Ok(Reply::Bulk(None));
    }
    let mut data = vec![0u8; len as usize];
    reader.read_exact(&mut data)?;

    let mut crlf = [0u8; 2];
    reader.read_exact(&mut crlf)?;
    if crlf != [b'\r', b'\n'] {
        return Err(Error::Protocol);
    }
    Ok(Reply::Bulk(Some(data)))
}

fn read_array<R: BufRead>(reader: &mut R, len: i64, line_buf: &mut Vec<u8>) -> Result<Reply> {
    if len <= 0 {
        return Ok(Reply::Array(Vec::new()));
    }
    let mut elements = Vec::with_capacity(len as usize);
    for _ in 0..len {
        elements.push(read_reply(reader, line_buf)?);
    }
    Ok(Reply::Array(elements))
}

fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<()> {
    buf.clear();
    let bytes = reader.read_until(b'\n', buf)?;
    if bytes == 0 {
        return Err(Error::Protocol);
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return Err(Error::Protocol);
    }
    buf.truncate(buf.len() - 2);
    Ok(())
}

fn parse_i64(data: &[u8]) -> Result<i64> {
    let text = std::str::from_utf8(data).map_err(|_| Error::Protocol)?;
    text.parse().map_err(|_| Error::Protocol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(input: &[u8]) -> Reply {
        let mut reader = Cursor::new(input.to_vec());
        let mut line = Vec::new();
        read_reply(&mut reader, &mut line).unwrap()
    }

    #[test]
    fn encodes_command() {
        let mut buf = Vec::new();
        encode_command(&[b"GET", b"key"], &mut buf);
        assert_eq!(&buf, b"*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n");
    }

    #[test]
    fn parses_simple_string() {
        assert_eq!(parse(b"+OK\r\n"), Reply::Simple(b"OK".to_vec()));
    }

    #[test]
    fn parses_bulk_string() {
        assert_eq!(parse(b"$5\r\nhello\r\n"), Reply::Bulk(Some(b"hello".to_vec())));
    }

    #[test]
    fn parses_null_bulk_string() {
        assert_eq!(parse(b"$-1\r\n"), Reply::Bulk(None));
    }

    #[test]
    fn parses_integer() {
        assert_eq!(parse(b":-42\r\n"), Reply::Integer(-42));
    }

    #[test]
    fn parses_error() {
        assert_eq!(parse(b"-ERR bad\r\n"), Reply::Error(b"ERR bad".to_vec()));
    }

    #[test]
    fn parses_array_of_bulks() {
        let reply = parse(b"*2\r\n$1\r\na\r\n$1\r\nb\r\n");
        assert_eq!(
            reply.items().unwrap(),
            vec![b"a".to_vec(), b"b".to_vec()]
        );
    }

    #[test]
    fn pairs_reject_odd_arrays() {
        let reply = parse(b"*3\r\n$1\r\na\r\n$1\r\nb\r\n$1\r\nc\r\n");
        assert!(matches!(reply.pairs(), Err(Error::UnexpectedReply)));
    }

    #[test]
    fn error_reply_surfaces_as_server_error() {
        let reply = parse(b"-ERR wrong type\r\n");
        assert!(matches!(reply.integer(), Err(Error::Server(_))));
    }
}

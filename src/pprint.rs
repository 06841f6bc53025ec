//! Pretty printing: a bracketed, indented textual view of a marker
//! stream.
//!
//! The printer consumes tokenizer output directly, so it never
//! materializes values and shows the wire exactly as parsed, including
//! no-op padding and the original marker choices:
//!
//! ```text
//! [o] [2]
//!     [s] [2] [id]
//!     [I] [1234567890]
//!     [s] [4] [name]
//!     [s] [3] [bob]
//! ```

use std::io::{Read, Write};

use crate::draft::Draft;
use crate::encode::Encoder;
use crate::error::Result;
use crate::source::Source;
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use crate::value::Value;

const INDENT: &str = "    ";

/// Pretty-prints UBJSON bytes as text. All top-level values in the
/// input are rendered.
pub fn pprint<W: Write>(data: &[u8], out: &mut W, draft: Draft) -> Result<()> {
    pprint_reader(data, out, draft)
}

/// Pretty-prints UBJSON read from a reader.
pub fn pprint_reader<R: Read, W: Write>(reader: R, out: &mut W, draft: Draft) -> Result<()> {
    tracing::trace!(draft = %draft, "pretty-printing stream");
    let mut tokens = Tokenizer::new(Source::new(reader), draft);
    print_tokens(&mut tokens, out)
}

/// Encodes a value and pretty-prints its wire form.
pub fn pprint_value<W: Write>(value: &Value, out: &mut W, draft: Draft) -> Result<()> {
    let bytes = Encoder::new(draft).encode(value)?;
    pprint(&bytes, out, draft)
}

/// Convenience wrapper returning the rendered text.
pub fn pprint_to_string(data: &[u8], draft: Draft) -> Result<String> {
    let mut out = Vec::new();
    pprint(data, &mut out, draft)?;
    // The printer only emits UTF-8 fragments.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Per-container token budget: `Some(n)` for a sized container (counted
/// in tokens, so objects get two per pair), `None` for streamed.
type Frame = Option<usize>;

fn print_tokens<R: Read, W: Write>(tokens: &mut Tokenizer<R>, out: &mut W) -> Result<()> {
    let mut stack: Vec<Frame> = Vec::new();

    while let Some(token) = tokens.next_token()? {
        match token.kind {
            TokenKind::Noop => {
                // Padding is shown but never counts toward a sized
                // container's budget.
                write_line(out, stack.len(), &render(&token))?;
            }
            TokenKind::ArrayOpen(declared) | TokenKind::ObjectOpen(declared) => {
                write_line(out, stack.len(), &render(&token))?;
                let budget = match token.kind {
                    TokenKind::ObjectOpen(Some(pairs)) => Some(pairs * 2),
                    _ => declared,
                };
                match budget {
                    // A sized container with no children closes on the
                    // spot and counts as one element of its parent.
                    Some(0) => finish_element(&mut stack),
                    other => stack.push(other),
                }
            }
            TokenKind::ArrayClose | TokenKind::ObjectClose | TokenKind::End => {
                if matches!(stack.last(), Some(None)) {
                    stack.pop();
                    write_line(out, stack.len(), &render(&token))?;
                    finish_element(&mut stack);
                } else {
                    // Stray close marker; render it where it appears.
                    write_line(out, stack.len(), &render(&token))?;
                }
            }
            _ => {
                write_line(out, stack.len(), &render(&token))?;
                finish_element(&mut stack);
            }
        }
    }
    Ok(())
}

/// Accounts for one completed element: decrements the innermost sized
/// budget and pops every sized container it exhausts, each popped
/// container completing an element of its own parent.
fn finish_element(stack: &mut Vec<Frame>) {
    while let Some(Some(remaining)) = stack.last_mut() {
        *remaining -= 1;
        if *remaining > 0 {
            return;
        }
        stack.pop();
    }
}

fn render(token: &Token) -> String {
    let tag = token.tag as char;
    match &token.kind {
        TokenKind::Noop
        | TokenKind::Null
        | TokenKind::Bool(_)
        | TokenKind::ArrayClose
        | TokenKind::ObjectClose
        | TokenKind::End
        | TokenKind::ArrayOpen(None)
        | TokenKind::ObjectOpen(None) => format!("[{tag}]"),
        TokenKind::ArrayOpen(Some(count)) | TokenKind::ObjectOpen(Some(count)) => {
            format!("[{tag}] [{count}]")
        }
        TokenKind::Int(i) => format!("[{tag}] [{i}]"),
        TokenKind::Float32(f) => format!("[{tag}] [{f}]"),
        TokenKind::Float64(f) => format!("[{tag}] [{f}]"),
        TokenKind::Char(c) => format!("[{tag}] [{c}]"),
        TokenKind::String(s) => format!("[{tag}] [{}] [{s}]", s.len()),
        TokenKind::Huge(s) => format!("[{tag}] [{}] [{s}]", s.len()),
    }
}

fn write_line<W: Write>(out: &mut W, depth: usize, text: &str) -> Result<()> {
    for _ in 0..depth {
        out.write_all(INDENT.as_bytes())?;
    }
    out.write_all(text.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

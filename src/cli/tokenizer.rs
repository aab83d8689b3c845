//! In-place command line tokenizer.

use core::str;

use heapless::Vec;

use super::{MAX_ARGS, TokenizeError};

/// Quote handling for [`tokenize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quoting {
    /// Split on whitespace only; quote characters are ordinary bytes.
    #[default]
    Disabled,
    /// `"..."` groups whitespace into one token and understands `\"`, `\\`,
    /// `\n`, `\t` and `\r` escapes.
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    len: usize,
}

/// Tokenized command line: argument spans into the caller's buffer.
///
/// `Args` borrows the buffer it was produced from, so the borrow checker
/// guarantees no argument outlives (or sees a reuse of) that buffer.
/// Every argument is a NUL-terminated run inside the buffer, or runs to its
/// very end.
#[derive(Debug, Clone)]
pub struct Args<'a> {
    line: &'a [u8],
    spans: Vec<Span, MAX_ARGS>,
}

impl<'a> Args<'a> {
    /// Number of arguments, including the command name.
    pub fn argc(&self) -> usize {
        self.spans.len()
    }

    /// Same as [`argc`](Self::argc).
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// `true` for an empty or whitespace-only line.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Argument `index`; index 0 is the command name.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        let span = self.spans.get(index)?;
        let line: &'a [u8] = self.line;
        str::from_utf8(&line[span.start..span.start + span.len]).ok()
    }

    /// The command name (`argv[0]`).
    pub fn command(&self) -> Option<&'a str> {
        self.get(0)
    }

    /// All arguments in order, command name first.
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        (0..self.argc()).filter_map(move |i| self.get(i))
    }

    /// The whole tokenized buffer, NUL terminators included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.line
    }
}

#[inline]
fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | 0)
}

#[inline]
fn unescape(byte: u8) -> u8 {
    match byte {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        other => other,
    }
}

/// Split `line` into arguments, destructively and without allocating.
///
/// Runs of delimiters (space, tab, CR, LF, NUL) collapse, so no empty token
/// is ever produced from whitespace. Every delimiter byte is overwritten with
/// NUL, which makes each argument an independently terminated string within
/// `line` and makes tokenizing an already tokenized buffer a no-op.
///
/// An empty or whitespace-only line yields empty [`Args`], not an error.
///
/// With [`Quoting::Enabled`], a quoted argument is unescaped and compacted in
/// place; the bytes it no longer needs, up to and including the closing
/// quote, are set to NUL. An unclosed quote runs to the end of the line, and
/// `""` produces an empty argument.
///
/// # Errors
///
/// * [`TokenizeError::TooManyArguments`] - more than [`MAX_ARGS`] tokens
/// * [`TokenizeError::InvalidUtf8`] - a token is not valid UTF-8
///
/// # Examples
///
/// ```rust
/// use libconsole::cli::{tokenize, Quoting};
///
/// let mut line = *b"kill  42 -9";
/// let args = tokenize(&mut line, Quoting::Disabled).unwrap();
/// assert_eq!(args.argc(), 3);
/// assert_eq!(args.iter().collect::<Vec<_>>(), ["kill", "42", "-9"]);
/// assert_eq!(args.as_bytes(), b"kill\0\042\0-9");
///
/// let mut line = *br#"conf set name "My Device""#;
/// let args = tokenize(&mut line, Quoting::Enabled).unwrap();
/// assert_eq!(args.get(3), Some("My Device"));
/// ```
pub fn tokenize(line: &mut [u8], quoting: Quoting) -> Result<Args<'_>, TokenizeError> {
    match split(line, quoting) {
        (args, None) => Ok(args),
        (_, Some(e)) => Err(e),
    }
}

/// Tokenize the whole of `line`, recording the first error instead of stopping at it.
///
/// Every delimiter is still overwritten and the first `MAX_ARGS` tokens are
/// still recorded, so the command name can be resolved even when a later
/// argument is rejected. A token that is not valid UTF-8 keeps its slot but
/// reads as `None` from [`Args::get`].
pub(crate) fn split(line: &mut [u8], quoting: Quoting) -> (Args<'_>, Option<TokenizeError>) {
    let mut spans: Vec<Span, MAX_ARGS> = Vec::new();
    let mut error = None;
    let len = line.len();
    let mut i = 0;

    while i < len {
        if is_delimiter(line[i]) {
            line[i] = 0;
            i += 1;
            continue;
        }

        let span = if quoting == Quoting::Enabled && line[i] == b'"' {
            line[i] = 0;
            i += 1;
            let start = i;
            let mut write_pos = i;

            while i < len {
                match line[i] {
                    b'\\' if i + 1 < len => {
                        line[write_pos] = unescape(line[i + 1]);
                        i += 2;
                    }
                    b'"' => {
                        i += 1;
                        break;
                    }
                    byte => {
                        line[write_pos] = byte;
                        i += 1;
                    }
                }
                write_pos += 1;
            }

            line[write_pos..i].fill(0);
            Span {
                start,
                len: write_pos - start,
            }
        } else {
            let start = i;
            while i < len && !is_delimiter(line[i]) {
                if quoting == Quoting::Enabled && line[i] == b'"' {
                    break;
                }
                i += 1;
            }
            Span {
                start,
                len: i - start,
            }
        };

        if str::from_utf8(&line[span.start..span.start + span.len]).is_err() {
            error.get_or_insert(TokenizeError::InvalidUtf8);
        }
        if spans.push(span).is_err() {
            error.get_or_insert(TokenizeError::TooManyArguments);
        }
    }

    (Args { line, spans }, error)
}

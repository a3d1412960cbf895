//! Quote-and-wrap output of `make` dependency rules.
//!
//! Produces a single `target: dep1 dep2 …` rule with the escaping GNU
//! make expects of file names and the classic 72-column continuation
//! (` \` at end of line, one space of indent on the next).

use std::io::{self, Write};

/// `make` rule lines wrap at this column.
const MAX_COLUMNS: usize = 72;

/// How a token is separated from the rest of the rule.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Spacer {
    /// The rule target; a `:` follows it.
    Colon,
    /// A prerequisite; a ` ` precedes it.
    Space,
    /// No separator (a prerequisite placed right after a line wrap).
    None,
}

/// Writes one rule, tracking the output column for line wrapping.
pub(crate) struct RuleWriter<W: Write> {
    out: W,
    column: usize,
}

impl<W: Write> RuleWriter<W> {
    pub(crate) fn new(out: W) -> Self {
        RuleWriter { out, column: 0 }
    }

    /// Write one quoted token, wrapping the line first if it won't fit.
    ///
    /// Zero-length tokens are skipped entirely. A wrap suppresses the
    /// space spacer, because the continuation already indents by one.
    pub(crate) fn token(&mut self, token: &[u8], spacer: Spacer) -> io::Result<()> {
        let len = quoted_len(token);
        if len == 0 {
            return Ok(());
        }

        let mut spacer = spacer;

        // One column is reserved for the spacer, two for the ` \`.
        if self.column != 0 && MAX_COLUMNS - 1 - 2 < self.column + len {
            self.out.write_all(b" \\\n ")?;
            self.column = 0;
            if spacer == Spacer::Space {
                spacer = Spacer::None;
            }
        }

        if spacer == Spacer::Space {
            self.out.write_all(b" ")?;
            self.column += 1;
        }

        self.column += quote_for_make(&mut self.out, token)?;

        if spacer == Spacer::Colon {
            self.out.write_all(b":")?;
            self.column += 1;
        }

        Ok(())
    }

    /// Terminate the rule, flush, and hand back the underlying writer.
    pub(crate) fn finish(mut self) -> io::Result<W> {
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Quote a file name the way `make` wants it quoted, returning the
/// number of bytes emitted.
///
/// GNU make uses a weird quoting scheme for white space: a space or tab
/// preceded by 2N+1 backslashes stands for N literal backslashes
/// followed by the space, and 2N backslashes at the end of a file name
/// stand for N literal backslashes. `$` is doubled. Backslashes in any
/// other position, and every other byte, pass through untouched (the
/// remaining `make` metacharacters like `%` and `*` can't be escaped
/// portably and are left alone). A NUL ends the token.
pub(crate) fn quote_for_make<W: Write>(out: &mut W, token: &[u8]) -> io::Result<usize> {
    let mut emitted = 0;

    for (position, &byte) in token.iter().enumerate() {
        match byte {
            b'\0' | b' ' | b'\t' => {
                // Double the backslash run directly before the white
                // space; the run itself was already emitted.
                for _ in 0..trailing_backslashes(&token[..position]) {
                    out.write_all(b"\\")?;
                    emitted += 1;
                }

                if byte == b'\0' {
                    return Ok(emitted);
                }

                out.write_all(b"\\")?;
                emitted += 1;
            }

            b'$' => {
                out.write_all(b"$")?;
                emitted += 1;
            }

            _ => {}
        }

        out.write_all(&[byte])?;
        emitted += 1;
    }

    // The end of the name doubles a trailing backslash run too.
    for _ in 0..trailing_backslashes(token) {
        out.write_all(b"\\")?;
        emitted += 1;
    }

    Ok(emitted)
}

/// Length the token will occupy once quoted, without writing anything.
pub(crate) fn quoted_len(token: &[u8]) -> usize {
    // PANIC SAFETY: writes to `io::sink` cannot fail.
    quote_for_make(&mut io::sink(), token).unwrap()
}

fn trailing_backslashes(bytes: &[u8]) -> usize {
    bytes.iter().rev().take_while(|&&byte| byte == b'\\').count()
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Line-oriented writer for declaration output.

use std::io::{self, Write};

/// Spaces per nesting level.
pub const INDENT_WIDTH: usize = 2;

/// Writes indented lines to an underlying sink.
///
/// The writer owns the sink for the whole generation pass; [`finish`]
/// flushes it and hands it back.
///
/// [`finish`]: DeclarationWriter::finish
pub struct DeclarationWriter<W: Write> {
    inner: W,
    lines: usize,
}

impl<W: Write> DeclarationWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, lines: 0 }
    }

    /// Write `text` at nesting `level`, followed by a newline.
    pub fn line(&mut self, level: usize, text: &str) -> io::Result<()> {
        write!(self.inner, "{:width$}{}", "", text, width = level * INDENT_WIDTH)?;
        self.newline()
    }

    /// Write an empty line.
    pub fn blank(&mut self) -> io::Result<()> {
        self.newline()
    }

    fn newline(&mut self) -> io::Result<()> {
        self.inner.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Number of lines written so far.
    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Flush and return the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indented_lines() {
        let mut writer = DeclarationWriter::new(Vec::new());
        writer.line(0, "declare module 'demo' {").expect("write");
        writer.line(2, "namespace msg {").expect("write");
        writer.blank().expect("write");
        writer.line(0, "}").expect("write");
        assert_eq!(writer.lines_written(), 4);

        let out = String::from_utf8(writer.finish().expect("finish")).expect("utf8");
        assert_eq!(out, "declare module 'demo' {\n    namespace msg {\n\n}\n");
    }
}

//! Line reader with one line of lookahead and line numbering

use crate::error::Result;
use std::io::BufRead;

pub(crate) struct LineReader<R> {
    reader: R,
    line_num: usize,
    peeked: Option<String>,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            line_num: 0,
            peeked: None,
        }
    }

    /// 1-based number of the last line returned by `next_line`
    pub(crate) fn line_num(&self) -> usize {
        self.line_num
    }

    /// Next line with the line terminator removed, `None` at end of input
    pub(crate) fn next_line(&mut self) -> Result<Option<String>> {
        let line = match self.peeked.take() {
            Some(line) => Some(line),
            None => self.read_raw()?,
        };
        if line.is_some() {
            self.line_num += 1;
        }
        Ok(line)
    }

    pub(crate) fn peek_line(&mut self) -> Result<Option<&str>> {
        if self.peeked.is_none() {
            self.peeked = self.read_raw()?;
        }
        Ok(self.peeked.as_deref())
    }

    /// Skip blank lines and return the next one with content
    pub(crate) fn next_nonblank(&mut self) -> Result<Option<String>> {
        self.skip_blank()?;
        self.next_line()
    }

    /// Skip blank lines and peek at the next one with content
    pub(crate) fn peek_nonblank(&mut self) -> Result<Option<&str>> {
        self.skip_blank()?;
        self.peek_line()
    }

    fn skip_blank(&mut self) -> Result<()> {
        loop {
            let blank = matches!(self.peek_line()?, Some(l) if l.trim().is_empty());
            if !blank {
                return Ok(());
            }
            self.next_line()?;
        }
    }

    fn read_raw(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }
}

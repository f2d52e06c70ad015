use super::{LineView, Position, SourceMap, TextSpan};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

impl Position {
    /// Create a new Position object based on the line and column number.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl TextSpan {
    pub fn new(line: usize, column: usize, begin: usize, end: usize, filename: Rc<str>) -> Self {
        Self {
            line,
            column,
            begin,
            end,
            filename,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl Display for TextSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

impl SourceMap {
    pub fn new(filename: &str) -> Self {
        Self {
            buffer: Vec::new(),
            line_starts: vec![0],
            filename: Rc::from(filename),
        }
    }

    pub fn filename(&self) -> Rc<str> {
        self.filename.clone()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append scanned bytes, recording the start offset of every new line.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.buffer.push(b);
            if b == b'\n' {
                self.line_starts.push(self.buffer.len());
            }
        }
    }

    /// The line and column at a byte offset. Offsets at or past the end of the
    /// buffer report the position one past the last recorded byte.
    pub fn position(&self, pos: usize) -> Position {
        let line = self.line_starts.partition_point(|&start| start <= pos);
        let start = self.line_starts[line - 1];
        Position::new(line, pos - start + 1)
    }

    /// The `[begin, end)` byte range of a 1-based line, including its terminating
    /// newline byte if present.
    pub fn line_span(&self, line: usize) -> Option<(usize, usize)> {
        if line == 0 || line > self.line_starts.len() {
            return None;
        }
        let begin = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.buffer.len());
        Some((begin, end))
    }

    /// The recorded bytes in `[begin, end)`, rendered lossily as UTF-8.
    pub fn slice(&self, begin: usize, end: usize) -> String {
        let end = end.min(self.buffer.len());
        let begin = begin.min(end);
        String::from_utf8_lossy(&self.buffer[begin..end]).into_owned()
    }

    /// The partial lines overlapping `[begin, end)`, each with in-line highlight
    /// offsets, for rendering diagnostics.
    pub fn lines(&self, begin: usize, end: usize) -> Vec<LineView> {
        let end = end.min(self.buffer.len());
        if begin >= end {
            return Vec::new();
        }

        let mut views = Vec::new();
        let first = self.line_starts.partition_point(|&start| start <= begin);
        for line in first..=self.line_starts.len() {
            let (line_begin, line_end) = match self.line_span(line) {
                Some(span) => span,
                None => break,
            };
            if line_begin >= end {
                break;
            }
            let mut text_end = line_end;
            while text_end > line_begin && {
                let b = self.buffer[text_end - 1];
                b == b'\n' || b == b'\r'
            } {
                text_end -= 1;
            }
            let highlight_begin = begin.max(line_begin) - line_begin;
            let highlight_end = end.min(text_end).max(line_begin) - line_begin;
            views.push(LineView {
                line,
                text: self.slice(line_begin, text_end),
                begin: highlight_begin,
                end: highlight_end,
            });
        }
        views
    }
}

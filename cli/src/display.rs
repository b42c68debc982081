//! Terminal rendering of a seven-segment digit.
use std::io::Write;

use termcolor::{self, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn get_colour_choice() -> termcolor::ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Writes a digit as three rows of ASCII art, lit segments in red.
///
/// Segment positions follow the usual lettering: `a` across the top,
/// `b`/`c` down the right, `d` across the bottom, `e`/`f` down the
/// left, `g` across the middle.  The pattern argument carries `a` in
/// bit 0 through `g` in bit 6.
pub struct SegmentDisplay {
    stream: StandardStream,
    lit: ColorSpec,
}

impl SegmentDisplay {
    pub fn new() -> SegmentDisplay {
        let mut lit = ColorSpec::new();
        lit.set_fg(Some(Color::Red)).set_bold(true);
        SegmentDisplay {
            stream: StandardStream::stdout(get_colour_choice()),
            lit,
        }
    }

    fn segment(&mut self, pattern: u8, segment: usize, glyph: &str) -> std::io::Result<()> {
        if pattern & (1 << segment) != 0 {
            self.stream.set_color(&self.lit)?;
            write!(self.stream, "{glyph}")?;
            self.stream.reset()
        } else {
            write!(self.stream, " ")
        }
    }

    /// Renders `pattern` with a caption of the simulated time.
    pub fn show(&mut self, caption: &str, pattern: u8) -> std::io::Result<()> {
        writeln!(self.stream, "{caption}")?;
        write!(self.stream, " ")?;
        self.segment(pattern, 0, "_")?; // a
        writeln!(self.stream)?;
        self.segment(pattern, 5, "|")?; // f
        self.segment(pattern, 6, "_")?; // g
        self.segment(pattern, 1, "|")?; // b
        writeln!(self.stream)?;
        self.segment(pattern, 4, "|")?; // e
        self.segment(pattern, 3, "_")?; // d
        self.segment(pattern, 2, "|")?; // c
        writeln!(self.stream)?;
        self.stream.flush()
    }
}

impl Default for SegmentDisplay {
    fn default() -> SegmentDisplay {
        SegmentDisplay::new()
    }
}

use std::io::{self, Write};

use crate::apis::Paper;

/// Write one paper as a markdown block.
///
/// The layout is consumed by tools that read this output as markdown, so it
/// must stay byte-for-byte stable.
pub fn render_paper<W: Write>(paper: &Paper, out: &mut W) -> io::Result<()> {
    writeln!(out, "####**{}**", paper.title)?;
    writeln!(out, "(Submitted on {})", paper.posted)?;
    writeln!(out, "\n")?;
    writeln!(out, "{}", paper.summary)?;
    writeln!(out, "{}", paper.link)?;
    writeln!(out, "---")
}

use crate::core::epub::{parent_dir, table_of_contents};
use crate::core::textify::{chapter_body, textify};
use crate::domain::ports::EntrySource;
use crate::utils::error::Result;
use std::io::Write;

/// Write every TOC entry as a title, an underline and the chapter text.
pub fn dump_book<S, W>(source: &mut S, maxcol: Option<usize>, out: &mut W) -> Result<()>
where
    S: EntrySource + ?Sized,
    W: Write,
{
    let chapters = table_of_contents(source)?;
    tracing::info!("Dumping {} table of contents entries", chapters.len());

    for entry in &chapters {
        writeln!(out, "{}", entry.title)?;
        writeln!(out, "{}", "-".repeat(entry.title.chars().count()))?;

        if let Some(src) = &entry.src {
            let html = String::from_utf8_lossy(&source.read_entry(src)?).into_owned();
            tracing::debug!("Rendering {} ({} bytes)", src, html.len());
            writeln!(out, "{}", textify(chapter_body(&html), parent_dir(src), maxcol))?;
        }

        writeln!(out, "\n")?;
    }

    out.flush()?;
    Ok(())
}

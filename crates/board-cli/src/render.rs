//! Text rendering of the projections

use board_core::{board_columns, list_sections, Request, RequestId, ViewMode};
use std::io::{self, Write};

/// Characters of the id shown in listings
pub const SHORT_ID_LEN: usize = 8;

/// Leading part of an id, enough to pass back as a prefix
#[must_use]
pub fn short_id(id: &RequestId) -> &str {
    let id = id.as_str();
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Render `requests` in `view`
pub fn render<W: Write>(out: &mut W, view: ViewMode, requests: &[Request]) -> io::Result<()> {
    match view {
        ViewMode::Board => render_board(out, requests),
        ViewMode::List => render_list(out, requests),
    }
}

/// One section per status
pub fn render_board<W: Write>(out: &mut W, requests: &[Request]) -> io::Result<()> {
    for (index, column) in board_columns(requests).iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{} ({})", column.status.label().to_uppercase(), column.len())?;
        write_section(out, &column.requests)?;
    }
    Ok(())
}

/// Open and completed sections
pub fn render_list<W: Write>(out: &mut W, requests: &[Request]) -> io::Result<()> {
    let sections = list_sections(requests);
    writeln!(out, "OPEN ({})", sections.open.len())?;
    write_section(out, &sections.open)?;
    writeln!(out)?;
    writeln!(out, "COMPLETED ({})", sections.completed.len())?;
    write_section(out, &sections.completed)
}

/// Shared error line
pub fn render_error<W: Write>(out: &mut W, error: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "! sync error: {error}")
}

fn write_section<W: Write>(out: &mut W, requests: &[&Request]) -> io::Result<()> {
    if requests.is_empty() {
        return writeln!(out, "  (none)");
    }
    for request in requests {
        write_card(out, request)?;
    }
    Ok(())
}

fn write_card<W: Write>(out: &mut W, request: &Request) -> io::Result<()> {
    write!(
        out,
        "  {:<8}  {:<11}  {:<16}  {}  created {}",
        short_id(&request.id),
        request.status.as_str(),
        request.requester,
        request.description,
        request.created_at.format("%Y-%m-%d %H:%M"),
    )?;
    if let Some(done) = request.completed_at {
        write!(out, ", completed {}", done.format("%Y-%m-%d %H:%M"))?;
    }
    writeln!(out)
}

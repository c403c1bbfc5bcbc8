use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};

use crate::error::FormatResult;
use crate::export::ExportOptions;
use crate::types::RecordSet;

/// Header line plus one line per record. Fields holding the delimiter, a quote or a line
/// terminator are quoted, so every record re-reads as one record.
pub(crate) fn write_delimited<W: Write>(
    rs: &RecordSet,
    writer: W,
    delimiter: u8,
    options: &ExportOptions,
) -> FormatResult<usize> {
    let mut wtr = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    wtr.write_record(rs.columns())?;
    for record in rs.records() {
        wtr.write_record(rs.columns().iter().map(|c| options.cell_text(record.get(c))))?;
    }
    wtr.flush()?;
    Ok(rs.row_count())
}

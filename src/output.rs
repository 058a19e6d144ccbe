//! Machine-readable result emission

use std::io::Write;

use crate::error::Result;
use crate::stt::TranscriptResult;

/// Serialize a result as a single JSON line
pub fn to_json_line(result: &TranscriptResult) -> Result<String> {
    Ok(serde_json::to_string(result)?)
}

/// Write the one result line to the given stream.
///
/// This is the sole output on the primary stream for success and failure
/// alike; diagnostics never go through here.
pub fn write_result<W: Write>(writer: &mut W, result: &TranscriptResult) -> Result<()> {
    let line = to_json_line(result)?;
    writeln!(writer, "{}", line)?;
    writer.flush()?;
    Ok(())
}

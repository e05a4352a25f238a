//! System operations for Slash
//!
//! `exit` and `strftime`, exposed to user programs on Object.
//!
//! `exit` does not terminate the process itself: it raises
//! `RuntimeError::Exit`, which unwinds like any other error (so scoped guards
//! such as the Array rendering flag are released) until the embedder turns it
//! into a process exit.

use crate::error::{Result, RuntimeError};
use crate::value::Value;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Valid exit code range for Unix compatibility (only low 8 bits are meaningful)
const EXIT_CODE_MIN: i64 = 0;
const EXIT_CODE_MAX: i64 = 255;

/// Raise an exit request with `code` (default 0)
///
/// Always returns `Err`: either the exit request or a type/argument error for
/// a bad code.
pub fn exit(code: Option<&Value>) -> Result<Value> {
    let code = match code {
        None => 0,
        Some(value) => value.expect_int("exit")?,
    };
    if !(EXIT_CODE_MIN..=EXIT_CODE_MAX).contains(&code) {
        return Err(RuntimeError::argument(format!(
            "exit: exit code must be in range {}-{}, got {}",
            EXIT_CODE_MIN, EXIT_CODE_MAX, code
        )));
    }
    Err(RuntimeError::Exit(code as i32))
}

/// Format `time` (seconds since the Unix epoch, UTC) with a strftime format
pub fn strftime(format: &Value, time: &Value) -> Result<Value> {
    let Value::String(format) = format else {
        return Err(RuntimeError::type_error(format!(
            "strftime: expected String (format), got {}",
            format.type_name()
        )));
    };
    let secs = time.expect_int("strftime")?;
    let datetime = DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
        RuntimeError::argument(format!("strftime: time {} out of range", secs))
    })?;

    // Display of an invalid format reports fmt::Error instead of text
    let mut out = String::new();
    write!(out, "{}", datetime.format(format)).map_err(|_| {
        RuntimeError::argument(format!("strftime: invalid format {:?}", format.as_ref()))
    })?;
    Ok(Value::from(out))
}

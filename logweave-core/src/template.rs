//! Interpolated message construction.
//!
//! A message is a list of literal fragments with one value between each
//! neighbouring pair, so `fragments.len() == values.len() + 1`:
//!
//! ```rust,ignore
//! let count = 3;
//! let text = logweave_core::render!("found ", count, " files")?;
//! assert_eq!(text, "found 3 files");
//! ```

use crate::error::{LogError, LogResult};
use crate::serialize::{serialize, Value};

/// Build a message from fragments and the values placed between them.
///
/// Every value is serialized, so this is where the cost of a log line is
/// paid. Callers that may not emit the line should check the gate first.
pub fn build(fragments: &[&str], values: &[Value<'_>]) -> LogResult<String> {
    if fragments.len() != values.len() + 1 {
        return Err(LogError::Template {
            fragments: fragments.len(),
            values: values.len(),
        });
    }

    let mut out = String::with_capacity(fragments.iter().map(|f| f.len()).sum());
    let rendered = values
        .iter()
        .map(|value| serialize(*value))
        .chain(std::iter::once(Ok(String::new())));

    for (fragment, value) in fragments.iter().zip(rendered) {
        out.push_str(fragment);
        out.push_str(&value?);
    }
    Ok(out)
}

/// Build a message from alternating fragment literals and values.
///
/// The first and last tokens are always literals, so the shape is checked
/// at compile time. Evaluates to `LogResult<String>`.
#[macro_export]
macro_rules! render {
    ($first:literal $(, $value:expr, $fragment:literal)* $(,)?) => {
        $crate::template::build(
            &[$first $(, $fragment)*],
            &[$($crate::IntoValue::into_value(&$value)),*],
        )
    };
}

/// Emit an interpolated message through an [`Emitter`](crate::Emitter).
///
/// ```rust,ignore
/// logweave_core::emit!(logger.info(), "loaded ", count, " entries")?;
/// ```
#[macro_export]
macro_rules! emit {
    ($emitter:expr, $first:literal $(, $value:expr, $fragment:literal)* $(,)?) => {
        $emitter.emit(
            &[$first $(, $fragment)*],
            &[$($crate::IntoValue::into_value(&$value)),*],
        )
    };
}

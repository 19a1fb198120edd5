//! Record preprocessing.
//!
//! Some sources wrap the interesting event as a JSON *string* inside the
//! record; SNS notifications carry it at `Records[*].Sns.Message`. Rules are
//! easier to write against structured data, so these helpers parse that string
//! in place before matching.

use crate::RecordBatch;
use crate::error::{Error, Result};
use serde_json::Value;

/// JSON pointer (relative to a record) of an SNS notification's message.
pub const SNS_MESSAGE_POINTER: &str = "/Sns/Message";

/// Return a copy of `batch` where the string found at `pointer` in each record
/// is replaced by the JSON it encodes.
///
/// Values that are already structured are left alone. A record without the
/// pointer, or with a string that is not valid JSON, fails the whole batch with
/// [`Error::Decode`]. `batch` itself is never modified.
pub fn decode_nested_json(batch: &RecordBatch, pointer: &str) -> Result<RecordBatch> {
    let mut decoded = batch.clone();

    for (index, record) in decoded.records.iter_mut().enumerate() {
        let slot = record
            .pointer_mut(pointer)
            .ok_or_else(|| Error::Decode { index, reason: format!("no value at {pointer}") })?;

        if let Some(text) = slot.as_str() {
            let parsed: Value = serde_json::from_str(text)
                .map_err(|err| Error::Decode { index, reason: format!("invalid JSON at {pointer}: {err}") })?;
            *slot = parsed;
        }
    }

    Ok(decoded)
}

/// [`decode_nested_json`] at [`SNS_MESSAGE_POINTER`].
pub fn decode_sns_messages(batch: &RecordBatch) -> Result<RecordBatch> {
    decode_nested_json(batch, SNS_MESSAGE_POINTER)
}

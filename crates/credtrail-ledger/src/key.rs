//! Composite keys.
//!
//! A composite key is `\0<object_type>\0<attr_1>\0...<attr_n>\0`. Every
//! segment is terminated by a NUL, so the key built from a leading subset of
//! attributes is a byte prefix of exactly the keys that share those whole
//! segments: the partial key for holder `D1` does not prefix keys of `D10`.

use crate::error::LedgerError;

const DELIMITER: char = '\u{0}';

/// Build a composite key from an object type and ordered attributes.
pub fn create_composite_key(object_type: &str, attributes: &[&str]) -> Result<String, LedgerError> {
    validate_segment(object_type, "object type")?;
    let mut key = String::with_capacity(
        2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>(),
    );
    key.push(DELIMITER);
    key.push_str(object_type);
    key.push(DELIMITER);
    for attribute in attributes {
        validate_segment(attribute, "attribute")?;
        key.push_str(attribute);
        key.push(DELIMITER);
    }
    Ok(key)
}

/// Split a composite key back into its object type and attributes.
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), LedgerError> {
    let body = key
        .strip_prefix(DELIMITER)
        .and_then(|rest| rest.strip_suffix(DELIMITER))
        .ok_or_else(|| LedgerError::InvalidKey(format!("not a composite key: {:?}", key)))?;
    let mut segments = body.split(DELIMITER).map(str::to_string);
    let object_type = segments.next().unwrap_or_default();
    Ok((object_type, segments.collect()))
}

/// Half-open byte range `[start, end)` covering every key that starts with
/// the composite `prefix`.
pub(crate) fn prefix_range(prefix: &str) -> (Vec<u8>, Vec<u8>) {
    let start = prefix.as_bytes().to_vec();
    let mut end = start.clone();
    // Composite prefixes always end with the NUL delimiter; bumping it to 0x01
    // gives the first key past the range.
    if let Some(last) = end.last_mut() {
        *last += 1;
    }
    (start, end)
}

/// Human-readable rendering of a stored key for logs and error messages.
pub fn printable_key(key: &[u8]) -> String {
    let text = String::from_utf8_lossy(key);
    match split_composite_key(&text) {
        Ok((object_type, attributes)) => {
            let mut out = object_type;
            for attribute in attributes {
                out.push(':');
                out.push_str(&attribute);
            }
            out
        }
        _ => text.into_owned(),
    }
}

fn validate_segment(segment: &str, what: &str) -> Result<(), LedgerError> {
    if segment.is_empty() {
        return Err(LedgerError::InvalidKey(format!("{} must not be empty", what)));
    }
    if segment.contains(DELIMITER) {
        return Err(LedgerError::InvalidKey(format!(
            "{} {:?} contains the reserved U+0000 delimiter",
            what, segment
        )));
    }
    Ok(())
}

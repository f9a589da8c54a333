//! Deep merge of content documents and path-addressed edits.
//!
//! Objects merge key by key. Anything else (arrays, strings, numbers,
//! booleans, `null`) is replaced wholesale by the overlay. An explicit
//! `null` in the overlay therefore erases the whole base subtree.

use crate::types::ContentDocument;
use crate::utils::{CmsError, CmsResult};
use serde_json::{Map, Value};

/// Overlay `overlay` onto `base` and return the result. Neither input is
/// modified.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    merge_values(Some(base), overlay)
}

/// `base` is `None` when the key is absent, which is distinct from a JSON `null`.
fn merge_values(base: Option<&Value>, overlay: &Value) -> Value {
    match (base, overlay) {
        (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
            let mut out: Map<String, Value> = base_map.clone();
            for (key, overlay_value) in overlay_map {
                out.insert(key.clone(), merge_values(base_map.get(key), overlay_value));
            }
            Value::Object(out)
        }
        _ => overlay.clone(),
    }
}

/// Set `value` at a dotted `path` inside `document`, consuming and returning
/// it. Numeric segments index into arrays. Missing object keys along the way
/// are created as empty objects. An empty path replaces the whole document.
pub fn with_path(
    mut document: ContentDocument,
    path: &str,
    value: Value,
) -> CmsResult<ContentDocument> {
    set_path(&mut document, path, value)?;
    Ok(document)
}

/// In-place form of [`with_path`]. On error the document is left untouched.
pub fn set_path(document: &mut ContentDocument, path: &str, value: Value) -> CmsResult<()> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();

    let Some((last, parents)) = segments.split_last() else {
        if !value.is_object() {
            return Err(CmsError::validation_error("document root must be an object"));
        }
        *document = value;
        return Ok(());
    };

    // Walk once read-only so a bad path never leaves half-created objects behind.
    validate_path(document, parents, last, path)?;

    let mut cursor = document;
    for segment in parents {
        cursor = match cursor {
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => {
                let index = parse_index(segment, path)?;
                &mut items[index]
            }
            _ => return Err(not_a_container(segment, path)),
        };
    }

    match cursor {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
        }
        Value::Array(items) => {
            let index = parse_index(last, path)?;
            items[index] = value;
        }
        _ => return Err(not_a_container(last, path)),
    }
    Ok(())
}

fn validate_path(document: &Value, parents: &[&str], last: &str, path: &str) -> CmsResult<()> {
    let mut cursor = Some(document);
    for segment in parents.iter().copied().chain(std::iter::once(last)) {
        cursor = match cursor {
            // Missing keys get created as objects, so everything below is fine.
            None => return Ok(()),
            Some(Value::Object(map)) => map.get(segment),
            Some(Value::Array(items)) => {
                let index = parse_index(segment, path)?;
                if index >= items.len() {
                    return Err(CmsError::validation_error(format!(
                        "index {} out of range at '{}' ({} items)",
                        index,
                        path,
                        items.len()
                    )));
                }
                items.get(index)
            }
            Some(_) => return Err(not_a_container(segment, path)),
        };
    }
    Ok(())
}

fn parse_index(segment: &str, path: &str) -> CmsResult<usize> {
    segment.parse::<usize>().map_err(|_| {
        CmsError::validation_error(format!(
            "segment '{}' of '{}' must be an array index",
            segment, path
        ))
    })
}

fn not_a_container(segment: &str, path: &str) -> CmsError {
    CmsError::validation_error(format!(
        "cannot set '{}' in '{}': parent is not an object or array",
        segment, path
    ))
}

/// Read the value at a dotted path, if present.
pub fn get_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .try_fold(document, |cursor, segment| match cursor {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

//! Minimal JSON-patch application
//!
//! Just enough of RFC 6902 to prove a shipped delta file is executable:
//! the six operation kinds over object members and array elements,
//! addressed by JSON pointers.
//!
//! Errors are split into two families because the delta validator treats
//! them differently: *semantic* errors (the patch addresses data the
//! synthetic document doesn't have) are expected and tolerated, while
//! *structural* errors (unknown op, malformed pointer, missing field)
//! mean the delta file itself is corrupt.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation kinds a delta file may carry
pub const KNOWN_OPS: &[&str] = &["add", "remove", "replace", "move", "copy", "test"];

/// One patch operation as shipped in a delta file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// Structural: the op kind is outside the fixed vocabulary
    #[error("unknown operation kind '{0}'")]
    UnknownOp(String),

    /// Structural: a pointer that doesn't start with '/' or removes the root
    #[error("malformed JSON pointer '{0}'")]
    MalformedPointer(String),

    /// Structural: the operation is missing a field its kind requires
    #[error("'{op}' operation missing required field '{field}'")]
    MissingField { op: String, field: &'static str },

    /// Semantic: the addressed location doesn't exist in this document
    #[error("target path '{0}' does not exist")]
    TargetMissing(String),

    /// Semantic: a 'test' operation found a different value
    #[error("test at '{0}' found a different value")]
    TestFailed(String),
}

impl PatchError {
    /// Semantic errors are expected when a patch meets data it was not
    /// generated from; structural errors condemn the patch itself.
    #[must_use]
    pub fn is_semantic(&self) -> bool {
        matches!(self, PatchError::TargetMissing(_) | PatchError::TestFailed(_))
    }
}

/// Split a pointer into unescaped reference tokens
fn split_pointer(pointer: &str) -> Result<Vec<String>, PatchError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PatchError::MalformedPointer(pointer.to_string()));
    };
    Ok(rest
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect())
}

/// Read the value at `pointer`, or a semantic error if absent
fn value_at<'doc>(doc: &'doc Value, pointer: &str) -> Result<&'doc Value, PatchError> {
    let tokens = split_pointer(pointer)?;
    let mut current = doc;
    for token in &tokens {
        current = match current {
            Value::Object(map) => map
                .get(token)
                .ok_or_else(|| PatchError::TargetMissing(pointer.to_string()))?,
            Value::Array(items) => {
                let index: usize = token
                    .parse()
                    .map_err(|_| PatchError::TargetMissing(pointer.to_string()))?;
                items
                    .get(index)
                    .ok_or_else(|| PatchError::TargetMissing(pointer.to_string()))?
            }
            _ => return Err(PatchError::TargetMissing(pointer.to_string())),
        };
    }
    Ok(current)
}

/// Navigate to the parent container of `pointer`, returning it with the
/// final token
fn parent_of<'doc>(
    doc: &'doc mut Value,
    pointer: &str,
) -> Result<(&'doc mut Value, String), PatchError> {
    let mut tokens = split_pointer(pointer)?;
    let Some(last) = tokens.pop() else {
        return Err(PatchError::MalformedPointer(pointer.to_string()));
    };
    let mut current = doc;
    for token in &tokens {
        current = match current {
            Value::Object(map) => map
                .get_mut(token)
                .ok_or_else(|| PatchError::TargetMissing(pointer.to_string()))?,
            Value::Array(items) => {
                let index: usize = token
                    .parse()
                    .map_err(|_| PatchError::TargetMissing(pointer.to_string()))?;
                items
                    .get_mut(index)
                    .ok_or_else(|| PatchError::TargetMissing(pointer.to_string()))?
            }
            _ => return Err(PatchError::TargetMissing(pointer.to_string())),
        };
    }
    Ok((current, last))
}

fn insert_at(doc: &mut Value, pointer: &str, value: Value) -> Result<(), PatchError> {
    if pointer.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, token) = parent_of(doc, pointer)?;
    match parent {
        Value::Object(map) => {
            map.insert(token, value);
            Ok(())
        }
        Value::Array(items) => {
            if token == "-" {
                items.push(value);
                return Ok(());
            }
            let index: usize = token
                .parse()
                .map_err(|_| PatchError::MalformedPointer(pointer.to_string()))?;
            if index > items.len() {
                return Err(PatchError::TargetMissing(pointer.to_string()));
            }
            items.insert(index, value);
            Ok(())
        }
        _ => Err(PatchError::TargetMissing(pointer.to_string())),
    }
}

fn remove_at(doc: &mut Value, pointer: &str) -> Result<Value, PatchError> {
    if pointer.is_empty() {
        return Err(PatchError::MalformedPointer(pointer.to_string()));
    }
    let (parent, token) = parent_of(doc, pointer)?;
    match parent {
        Value::Object(map) => map
            .remove(&token)
            .ok_or_else(|| PatchError::TargetMissing(pointer.to_string())),
        Value::Array(items) => {
            let index: usize = token
                .parse()
                .map_err(|_| PatchError::TargetMissing(pointer.to_string()))?;
            if index >= items.len() {
                return Err(PatchError::TargetMissing(pointer.to_string()));
            }
            Ok(items.remove(index))
        }
        _ => Err(PatchError::TargetMissing(pointer.to_string())),
    }
}

fn required_value(operation: &PatchOperation) -> Result<Value, PatchError> {
    operation.value.clone().ok_or(PatchError::MissingField {
        op: operation.op.clone(),
        field: "value",
    })
}

fn required_from(operation: &PatchOperation) -> Result<String, PatchError> {
    operation.from.clone().ok_or(PatchError::MissingField {
        op: operation.op.clone(),
        field: "from",
    })
}

fn apply_one(doc: &mut Value, operation: &PatchOperation) -> Result<(), PatchError> {
    match operation.op.as_str() {
        "add" => insert_at(doc, &operation.path, required_value(operation)?),
        "remove" => remove_at(doc, &operation.path).map(|_| ()),
        "replace" => {
            value_at(doc, &operation.path)?;
            insert_at(doc, &operation.path, required_value(operation)?)
        }
        "move" => {
            let from = required_from(operation)?;
            let moved = remove_at(doc, &from)?;
            insert_at(doc, &operation.path, moved)
        }
        "copy" => {
            let from = required_from(operation)?;
            let copied = value_at(doc, &from)?.clone();
            insert_at(doc, &operation.path, copied)
        }
        "test" => {
            let expected = required_value(operation)?;
            let actual = value_at(doc, &operation.path)?;
            if *actual == expected {
                Ok(())
            } else {
                Err(PatchError::TestFailed(operation.path.clone()))
            }
        }
        other => Err(PatchError::UnknownOp(other.to_string())),
    }
}

/// Apply an ordered operation list to `doc`, stopping at the first error
pub fn apply_patch(doc: &mut Value, operations: &[PatchOperation]) -> Result<(), PatchError> {
    for operation in operations {
        apply_one(doc, operation)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn op(kind: &str, path: &str, value: Option<Value>) -> PatchOperation {
        PatchOperation {
            op: kind.to_string(),
            path: path.to_string(),
            from: None,
            value,
        }
    }

    #[test]
    fn add_replace_remove_round() {
        let mut doc = json!({"cards": {}});
        let ops = vec![
            op("add", "/cards/ogn-001", Some(json!({"name": "Ironclad Vanguard"}))),
            op("replace", "/cards/ogn-001/name", Some(json!("Ironclad Vanguard, Reborn"))),
            op("remove", "/cards/ogn-001/name", None),
        ];
        apply_patch(&mut doc, &ops).unwrap();
        assert_eq!(doc, json!({"cards": {"ogn-001": {}}}));
    }

    #[test]
    fn move_and_copy() {
        let mut doc = json!({"a": 1, "b": {}});
        apply_patch(
            &mut doc,
            &[PatchOperation {
                op: "move".to_string(),
                path: "/b/a".to_string(),
                from: Some("/a".to_string()),
                value: None,
            }],
        )
        .unwrap();
        assert_eq!(doc, json!({"b": {"a": 1}}));
    }

    #[test]
    fn array_append_with_dash() {
        let mut doc = json!({"sets": ["ogn"]});
        apply_patch(&mut doc, &[op("add", "/sets/-", Some(json!("exp")))]).unwrap();
        assert_eq!(doc, json!({"sets": ["ogn", "exp"]}));
    }

    #[test]
    fn unknown_op_is_structural() {
        let mut doc = json!({});
        let err = apply_patch(&mut doc, &[op("merge", "/a", Some(json!(1)))]).unwrap_err();
        assert!(!err.is_semantic());
        assert!(matches!(err, PatchError::UnknownOp(_)));
    }

    #[test]
    fn pointer_without_leading_slash_is_structural() {
        let mut doc = json!({});
        let err = apply_patch(&mut doc, &[op("add", "cards/x", Some(json!(1)))]).unwrap_err();
        assert!(matches!(err, PatchError::MalformedPointer(_)));
        assert!(!err.is_semantic());
    }

    #[test]
    fn missing_target_is_semantic() {
        let mut doc = json!({"cards": {}});
        let err = apply_patch(&mut doc, &[op("remove", "/cards/nope", None)]).unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn failed_test_is_semantic() {
        let mut doc = json!({"version": "1.0.0"});
        let err =
            apply_patch(&mut doc, &[op("test", "/version", Some(json!("2.0.0")))]).unwrap_err();
        assert!(matches!(err, PatchError::TestFailed(_)));
        assert!(err.is_semantic());
    }

    #[test]
    fn missing_value_field_is_structural() {
        let mut doc = json!({});
        let err = apply_patch(&mut doc, &[op("add", "/a", None)]).unwrap_err();
        assert!(matches!(err, PatchError::MissingField { .. }));
        assert!(!err.is_semantic());
    }

    #[test]
    fn escaped_pointer_tokens() {
        let mut doc = json!({"a/b": {"~c": 1}});
        let value = value_at(&doc, "/a~1b/~0c").unwrap();
        assert_eq!(*value, json!(1));
        apply_patch(&mut doc, &[op("remove", "/a~1b/~0c", None)]).unwrap();
        assert_eq!(doc, json!({"a/b": {}}));
    }
}

//! Typed field access over the `serde_json` document tree
//!
//! Every accessor reports the entity path (`materials[3].pbrMetallicRoughness`)
//! in its error so structural failures point at the offending field.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// A JSON object together with its location in the document
#[derive(Debug, Clone)]
pub(crate) struct JsonObject<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> JsonObject<'a> {
    /// View `value` as an object located at `path`
    pub fn new(value: &'a Value, path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        match value {
            Value::Object(map) => Ok(Self { map, path }),
            _ => Err(structural(&path, "must be an object")),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a String> {
        self.map.keys()
    }

    /// Non-negative integer field used as an index or count
    pub fn index(&self, key: &str) -> Result<Option<usize>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|v| usize::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| self.field_error(key, "must be a non-negative integer")),
        }
    }

    pub fn required_index(&self, key: &str) -> Result<usize> {
        self.index(key)?
            .ok_or_else(|| self.field_error(key, "is required"))
    }

    pub fn index_or(&self, key: &str, default: usize) -> Result<usize> {
        Ok(self.index(key)?.unwrap_or(default))
    }

    /// Unsigned integer field holding a GL enum value
    pub fn enum_code(&self, key: &str) -> Result<Option<u64>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.field_error(key, "must be an integer enum value")),
        }
    }

    pub fn f32(&self, key: &str) -> Result<Option<f32>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => as_f32(value)
                .map(Some)
                .ok_or_else(|| self.field_error(key, "must be a number")),
        }
    }

    pub fn f32_or(&self, key: &str, default: f32) -> Result<f32> {
        Ok(self.f32(key)?.unwrap_or(default))
    }

    pub fn required_f32(&self, key: &str) -> Result<f32> {
        self.f32(key)?
            .ok_or_else(|| self.field_error(key, "is required"))
    }

    /// Fixed-length number array
    pub fn floats<const N: usize>(&self, key: &str) -> Result<Option<[f32; N]>> {
        let Some(values) = self.float_vec(key)? else {
            return Ok(None);
        };
        <[f32; N]>::try_from(values.as_slice())
            .map(Some)
            .map_err(|_| self.field_error(key, &format!("must have exactly {N} numbers")))
    }

    pub fn floats_or<const N: usize>(&self, key: &str, default: [f32; N]) -> Result<[f32; N]> {
        Ok(self.floats(key)?.unwrap_or(default))
    }

    pub fn float_vec(&self, key: &str) -> Result<Option<Vec<f32>>> {
        let Some(array) = self.array(key)? else {
            return Ok(None);
        };
        array
            .iter()
            .map(|v| as_f32(v).ok_or_else(|| self.field_error(key, "must contain only numbers")))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Number array kept at double precision (accessor bounds)
    pub fn f64_vec(&self, key: &str) -> Result<Option<Vec<f64>>> {
        let Some(array) = self.array(key)? else {
            return Ok(None);
        };
        array
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| self.field_error(key, "must contain only numbers"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Index array; absent keys yield an empty list
    pub fn indices(&self, key: &str) -> Result<Vec<usize>> {
        let Some(array) = self.array(key)? else {
            return Ok(Vec::new());
        };
        array
            .iter()
            .map(|v| {
                v.as_u64()
                    .and_then(|v| usize::try_from(v).ok())
                    .ok_or_else(|| self.field_error(key, "must contain non-negative integers"))
            })
            .collect()
    }

    pub fn str(&self, key: &str) -> Result<Option<&'a str>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.field_error(key, "must be a string")),
        }
    }

    pub fn required_str(&self, key: &str) -> Result<&'a str> {
        self.str(key)?
            .ok_or_else(|| self.field_error(key, "is required"))
    }

    pub fn string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.str(key)?.map(str::to_string))
    }

    /// Entity name (`name` key)
    pub fn name(&self) -> Result<Option<String>> {
        self.string("name")
    }

    pub fn string_vec(&self, key: &str) -> Result<Vec<String>> {
        let Some(array) = self.array(key)? else {
            return Ok(Vec::new());
        };
        array
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.field_error(key, "must contain only strings"))
            })
            .collect()
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.field_error(key, "must be a boolean")),
        }
    }

    pub fn array(&self, key: &str) -> Result<Option<&'a Vec<Value>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(array)) => Ok(Some(array)),
            Some(_) => Err(self.field_error(key, "must be an array")),
        }
    }

    /// Child object located at `<path>.<key>`
    pub fn child(&self, key: &str) -> Result<Option<JsonObject<'a>>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => JsonObject::new(value, self.join(key)).map(Some),
        }
    }

    /// Objects of an array field, located at `<path>.<key>[i]`
    pub fn child_array(&self, key: &str) -> Result<Vec<JsonObject<'a>>> {
        let Some(array) = self.array(key)? else {
            return Ok(Vec::new());
        };
        array
            .iter()
            .enumerate()
            .map(|(i, value)| JsonObject::new(value, format!("{}[{i}]", self.join(key))))
            .collect()
    }

    /// The entity's `extensions` object, if any
    pub fn extensions(&self) -> Result<Option<&'a Map<String, Value>>> {
        match self.get("extensions") {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(self.field_error("extensions", "must be an object")),
        }
    }

    pub fn field_error(&self, key: &str, reason: &str) -> Error {
        structural(&self.join(key), reason)
    }

    /// Path of a member; the document root has an empty path
    fn join(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }
}

pub(crate) fn structural(path: &str, reason: &str) -> Error {
    Error::InvalidGltf(format!("{path} {reason}"))
}

fn as_f32(value: &Value) -> Option<f32> {
    value.as_f64().map(|v| v as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_access() {
        let value = json!({
            "index": 3,
            "factor": 0.705,
            "color": [1.0, 0.5, 0.25],
            "name": "Lamp",
            "flag": true,
            "children": [0, 2]
        });
        let obj = JsonObject::new(&value, "nodes[0]").unwrap();

        assert_eq!(obj.index("index").unwrap(), Some(3));
        assert_eq!(obj.f32("factor").unwrap(), Some(0.705f32));
        assert_eq!(obj.floats::<3>("color").unwrap(), Some([1.0, 0.5, 0.25]));
        assert_eq!(obj.name().unwrap().as_deref(), Some("Lamp"));
        assert!(obj.bool_or("flag", false).unwrap());
        assert_eq!(obj.indices("children").unwrap(), vec![0, 2]);
        assert!(obj.indices("missing").unwrap().is_empty());
    }

    #[test]
    fn test_wrong_types_name_the_field() {
        let value = json!({ "index": -1, "color": [1.0, 2.0], "name": 5 });
        let obj = JsonObject::new(&value, "lights[2]").unwrap();

        let err = obj.index("index").unwrap_err();
        assert_eq!(
            err,
            Error::InvalidGltf("lights[2].index must be a non-negative integer".to_string())
        );
        assert!(obj.floats::<3>("color").is_err());
        assert!(obj.name().is_err());
    }

    #[test]
    fn test_non_object_rejected() {
        let value = json!([1, 2, 3]);
        assert!(JsonObject::new(&value, "scenes[0]").is_err());
    }
}

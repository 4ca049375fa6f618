//! Typed access to positional parameters.

use serde_json::Value;

use crate::error::{RpcError, RpcResult};

/// Positional parameters of a single call, bound to the method for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    method: &'static str,
    values: &'a [Value],
}

impl<'a> Params<'a> {
    /// Wrap the raw parameter list of `method`.
    #[must_use]
    pub const fn new(method: &'static str, values: &'a [Value]) -> Self {
        Self { method, values }
    }

    /// Method the parameters belong to.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.method
    }

    /// Fail unless at least `min` parameters were supplied.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidParams`] describing the shortfall.
    pub fn require(&self, min: usize) -> RpcResult<()> {
        if self.values.len() < min {
            let noun = if min == 1 { "parameter" } else { "parameters" };
            return Err(self.invalid(format!(
                "expected at least {min} {noun}, got {}",
                self.values.len()
            )));
        }
        Ok(())
    }

    /// Required string parameter.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidParams`] when missing or not a string.
    pub fn str(&self, index: usize) -> RpcResult<&'a str> {
        self.get(index)?
            .as_str()
            .ok_or_else(|| self.wrong_type(index, "a string"))
    }

    /// Optional string parameter; absent and `null` both yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidParams`] when present but not a string.
    pub fn opt_str(&self, index: usize) -> RpcResult<Option<&'a str>> {
        self.optional(index)
            .map(|value| value.as_str().ok_or_else(|| self.wrong_type(index, "a string")))
            .transpose()
    }

    /// Required boolean parameter.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidParams`] when missing or not a boolean.
    pub fn bool(&self, index: usize) -> RpcResult<bool> {
        self.get(index)?
            .as_bool()
            .ok_or_else(|| self.wrong_type(index, "a boolean"))
    }

    /// Optional boolean parameter; absent and `null` both yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidParams`] when present but not a boolean.
    pub fn opt_bool(&self, index: usize) -> RpcResult<Option<bool>> {
        self.optional(index)
            .map(|value| value.as_bool().ok_or_else(|| self.wrong_type(index, "a boolean")))
            .transpose()
    }

    /// Required non-negative integer that fits in 32 bits.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidParams`] when missing, negative, fractional or too large.
    pub fn u32(&self, index: usize) -> RpcResult<u32> {
        self.get(index)?
            .as_u64()
            .and_then(|value| u32::try_from(value).ok())
            .ok_or_else(|| self.wrong_type(index, "a non-negative integer"))
    }

    /// Required numeric parameter.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidParams`] when missing or not a number.
    pub fn f64(&self, index: usize) -> RpcResult<f64> {
        self.get(index)?
            .as_f64()
            .ok_or_else(|| self.wrong_type(index, "a number"))
    }

    /// Required array of strings.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidParams`] when missing, not an array, or when
    /// any element is not a string.
    pub fn str_list(&self, index: usize) -> RpcResult<Vec<&'a str>> {
        self.get(index)?
            .as_array()
            .and_then(|items| items.iter().map(Value::as_str).collect())
            .ok_or_else(|| self.wrong_type(index, "an array of strings"))
    }

    fn get(&self, index: usize) -> RpcResult<&'a Value> {
        self.values
            .get(index)
            .ok_or_else(|| self.invalid(format!("parameter {index} is missing")))
    }

    fn optional(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index).filter(|value| !value.is_null())
    }

    fn wrong_type(&self, index: usize, expected: &str) -> RpcError {
        self.invalid(format!("parameter {index} must be {expected}"))
    }

    fn invalid(&self, reason: String) -> RpcError {
        RpcError::InvalidParams {
            method: self.method,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_reports_shortfall() {
        let values = [json!("a")];
        let params = Params::new("remove_torrent", &values);
        let err = params.require(2).expect_err("one short");
        assert_eq!(
            err.to_string(),
            "invalid params for 'remove_torrent': expected at least 2 parameters, got 1"
        );
        assert!(params.require(1).is_ok());
    }

    #[test]
    fn typed_accessors_reject_wrong_types() {
        let values = [json!(42), json!("yes"), json!(-1), json!(["a", 1])];
        let params = Params::new("stream_torrent", &values);
        assert_eq!(
            params.str(0).expect_err("number").to_string(),
            "invalid params for 'stream_torrent': parameter 0 must be a string"
        );
        assert!(params.bool(1).is_err());
        assert!(params.u32(2).is_err());
        assert!(params.str_list(3).is_err());
        assert!(params.f64(0).is_ok());
    }

    #[test]
    fn optional_values_treat_null_as_absent() -> anyhow::Result<()> {
        let values = [json!("magnet:?xt"), Value::Null];
        let params = Params::new("add_torrent", &values);
        assert_eq!(params.opt_str(1)?, None);
        assert_eq!(params.opt_bool(2)?, None);
        assert!(Params::new("add_torrent", &[json!(1)]).opt_str(0).is_err());
        Ok(())
    }

    #[test]
    fn string_lists_decode() -> anyhow::Result<()> {
        let values = [json!(["h1", "h2"])];
        let params = Params::new("pause_group", &values);
        assert_eq!(params.str_list(0)?, vec!["h1", "h2"]);
        Ok(())
    }
}

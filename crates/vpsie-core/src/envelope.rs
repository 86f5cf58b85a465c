//! Response envelope shared by every VPSie endpoint.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Outer JSON object wrapping every API response.
///
/// The endpoint-specific payload keys live next to `error` / `errorCode` in
/// the same object, so the payload is flattened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    /// Set when the API rejected the request.
    #[serde(default, deserialize_with = "null_as_default")]
    pub error: bool,
    /// Provider error code; empty on success.
    #[serde(rename = "errorCode", default, deserialize_with = "null_as_default")]
    pub error_code: String,
    /// Endpoint-specific payload.
    #[serde(flatten)]
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap a successful payload.
    pub fn ok(data: T) -> Self {
        Self {
            error: false,
            error_code: String::new(),
            data,
        }
    }

    /// Returns the payload, or [`Error::Api`] when the error flag is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] carrying `errorCode` when `error` is true.
    pub fn into_result(self) -> Result<T> {
        if self.error {
            Err(Error::Api {
                code: self.error_code,
            })
        } else {
            Ok(self.data)
        }
    }
}

/// Decode an explicit `null` as the field's default value.
///
/// Combine with `#[serde(default)]` so a missing key defaults too.
///
/// # Errors
///
/// Fails only when a non-null value has the wrong type.
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let option = Option::<T>::deserialize(deserializer)?;
    Ok(option.unwrap_or_default())
}

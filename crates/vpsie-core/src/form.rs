//! Builder for `application/x-www-form-urlencoded` request bodies.
//!
//! Every VPSie write endpoint takes a form body. Optional fields are sent
//! only when present, so the builder distinguishes "absent" from "present
//! with a value" through `Option`.

use std::fmt::Display;
use url::form_urlencoded;

/// Content type sent with every form body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Ordered collection of form fields.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormParams {
    pairs: Vec<(&'static str, String)>,
}

impl FormParams {
    /// Create a new, empty form.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a required field.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Append a field when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append `key=<expected>` only when the flag is explicitly set to `expected`.
    ///
    /// The provider treats the opposite value as its default, so only the
    /// non-default state is ever put on the wire.
    pub fn push_flag(&mut self, key: &'static str, value: Option<bool>, expected: bool) {
        if value == Some(expected) {
            self.pairs.push((key, expected.to_string()));
        }
    }

    /// Chaining variant of [`FormParams::push`].
    #[must_use]
    pub fn with<T>(mut self, key: &'static str, value: T) -> Self
    where
        T: Display,
    {
        self.push(key, value);
        self
    }

    /// Returns true if no fields have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns true if a field with this key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| *k == key)
    }

    /// Returns the value of the first field with this key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Encode the fields in insertion order.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::FormParams;

    #[test]
    fn push_opt_skips_none() {
        let mut form = FormParams::new();
        form.push_opt("note", Option::<String>::None);
        assert!(form.is_empty());
    }

    #[test]
    fn push_flag_only_emits_expected_value() {
        let mut form = FormParams::new();
        form.push_flag("ipv4", Some(true), false);
        form.push_flag("ipv4", None, false);
        assert!(form.is_empty());

        form.push_flag("ipv4", Some(false), false);
        assert_eq!(form.get("ipv4"), Some("false"));
    }

    #[test]
    fn encode_preserves_order_and_escapes() {
        let form = FormParams::new()
            .with("hostname", "web 01")
            .with("note", "a&b=c");
        assert_eq!(form.encode(), "hostname=web+01&note=a%26b%3Dc");
    }

    #[test]
    fn empty_form_encodes_to_empty_string() {
        assert_eq!(FormParams::new().encode(), "");
    }
}

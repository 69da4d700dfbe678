//! Named text fields backing one input form.

use crate::error::FormFieldError;

/// Ordered set of named string fields with their initial values.
///
/// Field names are fixed at construction; `on_change` never adds a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    initial: Vec<(String, String)>,
    current: Vec<(String, String)>,
}

impl FormFields {
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let initial: Vec<(String, String)> = fields
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Self {
            current: initial.clone(),
            initial,
        }
    }

    /// Form with every named field starting empty.
    pub fn empty(names: &[&str]) -> Self {
        Self::new(names.iter().map(|name| (*name, "")))
    }

    pub fn on_change(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormFieldError> {
        let slot = self
            .current
            .iter_mut()
            .find(|(field, _)| field == name)
            .ok_or_else(|| FormFieldError::UnknownField(name.to_string()))?;
        slot.1 = value.into();
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.current
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Field value with surrounding whitespace removed; empty for unknown names.
    pub fn trimmed(&self, name: &str) -> &str {
        self.get(name).map(str::trim).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.current
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn reset(&mut self) {
        self.current.clone_from(&self.initial);
    }

    pub fn are_all_filled(&self) -> bool {
        self.current.iter().all(|(_, value)| !value.trim().is_empty())
    }

    pub fn missing_fields(&self) -> Vec<String> {
        self.current
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

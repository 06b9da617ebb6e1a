//! Query parameters and the per-parameter validation rules.

use std::collections::BTreeMap;

use url::form_urlencoded;

// == Query Params ==
/// Multi-valued query string, keyed in sorted order.
///
/// Values keep the order they appeared in. Encoding is deterministic: two
/// query strings that differ only in parameter order encode identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Parses a raw (still percent-encoded) query string.
    pub fn parse(raw: &str) -> Self {
        let mut params = Self::default();
        for (name, value) in form_urlencoded::parse(raw.as_bytes()) {
            params.append(&name, &value);
        }
        params
    }

    pub fn append(&mut self, name: &str, value: &str) {
        self.params
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Drops every value of `name`.
    pub fn remove(&mut self, name: &str) {
        self.params.remove(name);
    }

    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Serializes as `application/x-www-form-urlencoded`, sorted by name.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, values) in &self.params {
            for value in values {
                serializer.append_pair(name, value);
            }
        }
        serializer.finish()
    }
}

// == Param Rule ==
/// Validation applied to the raw values of one allowed query parameter.
///
/// Every rule rejects a parameter that appears more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRule {
    /// An integer that is an exact multiple of the page size.
    PageAlignedOffset(i64),
    /// An integer drawn from a fixed set of identifiers.
    Category(&'static [i64]),
    /// Exactly this string.
    Literal(&'static str),
    /// Any value.
    FreeText,
}

impl ParamRule {
    pub fn check(&self, values: &[String]) -> bool {
        let [value] = values else {
            return false;
        };

        match *self {
            ParamRule::PageAlignedOffset(page) => value
                .parse::<i64>()
                .map(|offset| page != 0 && offset % page == 0)
                .unwrap_or(false),
            ParamRule::Category(known) => value
                .parse::<i64>()
                .map(|id| known.contains(&id))
                .unwrap_or(false),
            ParamRule::Literal(expected) => value == expected,
            ParamRule::FreeText => true,
        }
    }
}

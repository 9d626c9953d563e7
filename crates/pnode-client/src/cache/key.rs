use std::collections::BTreeMap;
use std::fmt;

/// Identity of a cached query: a name plus its canonicalized parameters.
///
/// Parameters are kept sorted, so insertion order never produces two keys
/// for the same logical query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    name: String,
    params: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_order_is_canonical() {
        let a = QueryKey::new("pnodes").param("limit", 20).param("skip", 0);
        let b = QueryKey::new("pnodes").param("skip", 0).param("limit", 20);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "pnodes?limit=20&skip=0");
    }

    #[test]
    fn test_distinct_params_distinct_keys() {
        let a = QueryKey::new("network-history").param("hours", 24);
        let b = QueryKey::new("network-history").param("hours", 168);
        assert_ne!(a, b);
        assert_eq!(QueryKey::new("health").to_string(), "health");
    }
}

//! Common API utilities and shared types

use serde::{Deserialize, Deserializer};

use crate::models::ListParams;

/// Query parameters shared by the paged list endpoints
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub include_hidden: bool,
}

impl ListQuery {
    pub fn params(&self, default_limit: i64) -> ListParams {
        ListParams::new(self.skip, self.limit.unwrap_or(default_limit))
    }
}

/// Query carrying only the `include_hidden` flag
#[derive(Debug, Default, Deserialize)]
pub struct VisibilityQuery {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub include_hidden: bool,
}

/// Accept `true`/`false`/`1`/`0` in query strings
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery = serde_urlencoded_parse("");
        assert_eq!(query.skip, 0);
        assert!(!query.include_hidden);
        let params = query.params(20);
        assert_eq!(params.limit, 20);
        assert_eq!(params.skip, 0);
    }

    #[test]
    fn test_list_query_parses_flags() {
        let query: ListQuery = serde_urlencoded_parse("skip=5&limit=3&include_hidden=true");
        assert_eq!(query.params(20).limit, 3);
        assert_eq!(query.params(20).skip, 5);
        assert!(query.include_hidden);

        let query: VisibilityQuery = serde_urlencoded_parse("include_hidden=1");
        assert!(query.include_hidden);
    }

    fn serde_urlencoded_parse<T: serde::de::DeserializeOwned>(qs: &str) -> T {
        let uri: axum::http::Uri = format!("/x?{}", qs).parse().unwrap();
        axum::extract::Query::<T>::try_from_uri(&uri).unwrap().0
    }
}

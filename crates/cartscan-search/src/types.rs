use serde::{Deserialize, Serialize};

/// One search request: a term looked up around a postal code in a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub postal_code: String,
    pub country_code: String,
}

impl SearchQuery {
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        postal_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            postal_code: postal_code.into(),
            country_code: country_code.into(),
        }
    }
}

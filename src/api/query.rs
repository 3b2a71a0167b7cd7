use chrono::NaiveDate;

use crate::config::Config;

/// Query parameters accepted by the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    limit: u32,
    status: Option<String>,
    provider: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    search: Option<String>,
}

impl ListQuery {
    /// Pages are 1-based; a zero page or limit is raised to 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            status: None,
            provider: None,
            start_date: None,
            end_date: None,
            search: None,
        }
    }

    /// First page using the configured page size.
    pub fn from_config(config: &Config) -> Self {
        Self::new(1, config.default_page_size)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = non_blank(status.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = non_blank(provider.into());
        self
    }

    /// Bounds are inclusive; they are stored in ascending order.
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = non_blank(search.into());
        self
    }

    /// Ordered `(name, value)` pairs ready to be URL-encoded by the transport.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        let optional = [
            ("status", self.status.clone()),
            ("provider", self.provider.clone()),
            ("startDate", self.start_date.map(|date| date.format("%Y-%m-%d").to_string())),
            ("endDate", self.end_date.map(|date| date.format("%Y-%m-%d").to_string())),
            ("search", self.search.clone()),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                pairs.push((name.to_string(), value));
            }
        }
        pairs
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &ListQuery) -> Vec<String> {
        query
            .pairs()
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect()
    }

    #[test]
    fn pagination_only_by_default() {
        assert_eq!(pairs(&ListQuery::default()), vec!["page=1", "limit=10"]);
    }

    #[test]
    fn filters_follow_pagination_in_fixed_order() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let query = ListQuery::new(2, 25)
            .with_search("rust")
            .with_status("paid")
            .with_provider("stripe")
            .with_date_range(start, end);
        assert_eq!(
            pairs(&query),
            vec![
                "page=2",
                "limit=25",
                "status=paid",
                "provider=stripe",
                "startDate=2025-01-01",
                "endDate=2025-01-31",
                "search=rust",
            ]
        );
    }

    #[test]
    fn blank_filters_and_zero_paging_are_normalized() {
        let query = ListQuery::new(0, 0).with_status("  ");
        assert_eq!(pairs(&query), vec!["page=1", "limit=1"]);
    }

    #[test]
    fn page_size_comes_from_config() {
        let config = Config {
            default_page_size: 50,
            ..Config::default()
        };
        assert_eq!(ListQuery::from_config(&config).limit(), 50);
    }
}

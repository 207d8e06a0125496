use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::config::ExecutorConfig;
use crate::database::PageRequest;
use crate::services::ServiceError;

/// Renders epoch millis as `YYYY-MM-DD HH:MM:SS` in server local time.
/// Zero renders as an empty string.
pub fn format_time(millis: i64) -> String {
    if millis == 0 {
        return String::new();
    }
    match Local.timestamp_millis_opt(millis).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}

pub fn format_time_opt(millis: Option<i64>) -> Option<String> {
    millis.map(format_time)
}

/// `page`/`size` as supplied by the caller
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PageParams {
    pub fn resolve(&self, config: &ExecutorConfig) -> Result<PageRequest, ServiceError> {
        let page = self.page.unwrap_or(1);
        let size = self.size.unwrap_or(config.default_page_size);

        if page < 1 {
            return Err(ServiceError::Validation("page must be at least 1".into()));
        }
        if size < 1 || size > config.max_page_size {
            return Err(ServiceError::Validation(format!(
                "size must be between 1 and {}",
                config.max_page_size
            )));
        }
        if (page - 1).checked_mul(size).is_none() {
            return Err(ServiceError::Validation("page is out of range".into()));
        }
        Ok(PageRequest { page, size })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub records: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

impl<T> PageResult<T> {
    pub fn new(records: Vec<T>, total: i64, page: PageRequest) -> Self {
        Self {
            records,
            total,
            page: page.page,
            size: page.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn zero_time_is_blank() {
        assert_eq!(format_time(0), "");
        let rendered = format_time(1_700_000_000_000);
        assert_eq!(rendered.len(), 19);
        assert_eq!(&rendered[4..5], "-");
        assert_eq!(&rendered[13..14], ":");
    }

    #[test]
    fn page_defaults_and_bounds() {
        let config = AppConfig::development().executor;

        let defaults = PageParams::default().resolve(&config).unwrap();
        assert_eq!(defaults, PageRequest { page: 1, size: 10 });
        assert_eq!(defaults.offset(), 0);

        let third = PageParams { page: Some(3), size: Some(20) }.resolve(&config).unwrap();
        assert_eq!(third.offset(), 40);

        assert!(PageParams { page: Some(0), size: None }.resolve(&config).is_err());
        assert!(PageParams { page: None, size: Some(0) }.resolve(&config).is_err());
        assert!(PageParams { page: None, size: Some(1001) }.resolve(&config).is_err());
        assert!(PageParams { page: None, size: Some(1000) }.resolve(&config).is_ok());
    }

    #[test]
    fn page_offset_must_fit() {
        let config = AppConfig::development().executor;

        let huge = PageParams { page: Some(i64::MAX), size: Some(10) }.resolve(&config);
        assert!(matches!(huge, Err(ServiceError::Validation(_))));

        let last = PageParams { page: Some(i64::MAX / 10), size: Some(10) }
            .resolve(&config)
            .unwrap();
        assert!(last.offset() > 0);
    }
}

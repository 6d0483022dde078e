//! This modules defines the common functionality for paging data.

use serde::Deserialize;

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationConfig {
    /// The number of items per page when a page is requested without a limit.
    pub default_page_size: u64,
    /// The largest page a client may request.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// The `?page&limit` query parameters. Pages start at one.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// The rows to select for one page, sized to fit SQLite's signed integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub limit: i64,
    pub offset: i64,
}

impl PaginationConfig {
    /// Work out which rows a request asked for.
    ///
    /// Returns `None` when neither parameter is given, meaning "everything".
    ///
    /// # Errors
    /// Returns an [Error::InvalidPagination] if `page` or `limit` is zero, if
    /// `limit` is larger than [PaginationConfig::max_page_size], or if the page
    /// starts beyond the largest row offset SQLite can represent.
    pub fn page_range(&self, params: &PageParams) -> Result<Option<PageRange>, Error> {
        if params.page.is_none() && params.limit.is_none() {
            return Ok(None);
        }

        let page = params.page.unwrap_or(1);
        let limit = params.limit.unwrap_or(self.default_page_size);

        if page == 0 {
            return Err(Error::InvalidPagination(
                "page numbers start at 1".to_owned(),
            ));
        }

        if limit == 0 || limit > self.max_page_size {
            return Err(Error::InvalidPagination(format!(
                "limit must be between 1 and {}, got {limit}",
                self.max_page_size
            )));
        }

        let out_of_range =
            || Error::InvalidPagination(format!("page {page} with limit {limit} is out of range"));
        let offset = (page - 1)
            .checked_mul(limit)
            .and_then(|offset| i64::try_from(offset).ok())
            .ok_or_else(out_of_range)?;
        let limit = i64::try_from(limit).map_err(|_| out_of_range())?;

        Ok(Some(PageRange { limit, offset }))
    }
}

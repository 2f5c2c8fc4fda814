use crate::error::{ApiError, ApiResult};
use garde::Validate;
use movies_dal::{genre::Genre, Batch, ListingParams, Order};
use serde::{Deserialize, Serialize};

const MAX_ORDERING_NAME: usize = 100;

#[derive(Debug, Clone, Default, Validate, Deserialize)]
#[garde(allow_unvalidated)]
pub struct Paging {
    #[garde(range(min = 1))]
    page: Option<u32>,
    #[garde(range(min = 1, max = 1000))]
    page_size: Option<u32>,
    #[garde(length(max = 255))]
    sort: Option<String>,
    genre: Option<Genre>,
}

fn parse_ordering(orderings: &str) -> ApiResult<Vec<Order>> {
    orderings
        .split(',')
        .map(|name| {
            let (field_name, descending) = match name.trim() {
                "" => return Err(ApiError::InvalidQuery("Empty ordering name".to_string())),
                name if name.len() > MAX_ORDERING_NAME => {
                    return Err(ApiError::InvalidQuery(
                        "Ordering name too long".to_string(),
                    ))
                }
                name if name.starts_with('+') => (&name[1..], false),
                name if name.starts_with('-') => (&name[1..], true),
                name => (name, false),
            };

            let order = if descending {
                Order::Desc(field_name.to_string())
            } else {
                Order::Asc(field_name.to_string())
            };

            Ok(order)
        })
        .collect()
}

impl Paging {
    pub fn into_listing_params(self, default_page_size: u32) -> ApiResult<ListingParams> {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size(default_page_size);
        let offset = i64::from(page - 1) * i64::from(page_size);
        let order = self.sort.as_deref().map(parse_ordering).transpose()?;

        Ok(ListingParams {
            offset,
            limit: page_size.into(),
            order,
        })
    }

    /// Requested page size, never zero
    pub fn page_size(&self, default_page_size: u32) -> u32 {
        self.page_size.unwrap_or(default_page_size).max(1)
    }

    pub fn genre(&self) -> Option<Genre> {
        self.genre
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total: u64,
    pub rows: Vec<T>,
}

impl<T> Page<T>
where
    T: Serialize,
{
    pub fn try_from_batch(batch: Batch<T>, page_size: u32) -> ApiResult<Self> {
        if page_size == 0 {
            return Err(ApiError::InvalidQuery("Page size must be positive".to_string()));
        }
        let out_of_range = |e: std::num::TryFromIntError| ApiError::InvalidQuery(format!("Page out of range: {e}"));
        Ok(Self {
            page: u32::try_from(batch.offset).map_err(out_of_range)? / page_size + 1,
            page_size,
            total_pages: u32::try_from(batch.total.div_ceil(u64::from(page_size)))
                .map_err(out_of_range)?,
            total: batch.total,
            rows: batch.rows,
        })
    }
}

// src/models/common.rs - Shared response envelopes
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic pagination envelope shared by every list endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
}

pub type PaginatedTransactionResponse = Paginated<crate::models::transaction::TransactionResponse>;
pub type PaginatedAlertResponse = Paginated<crate::models::alert::AlertResponse>;
pub type PaginatedRuleResponse = Paginated<crate::models::rule::RuleResponse>;

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        Self { items, page, page_size, total }
    }
}

/// Shared pagination query params — `page` is 1-indexed.
#[derive(Debug, Clone, Copy, Deserialize, utoipa::IntoParams)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
            .unwrap_or(crate::constants::DEFAULT_PAGE_SIZE)
            .clamp(1, crate::constants::MAX_PAGE_SIZE)
    }
}

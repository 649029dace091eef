//! Response models for the analytics surface.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsSummary {
    pub total_spend: i64,
    pub order_count: i64,
    pub supplier_count: i64,
    pub avg_order_value: i64,
    /// Current month, "2025年12月" format.
    pub period: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopSupplier {
    pub supplier_id: String,
    pub name: String,
    pub total_spend: i64,
    pub order_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopSuppliersResponse {
    pub suppliers: Vec<TopSupplier>,
    pub period: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FrequentProduct {
    pub product_name: String,
    pub total_quantity: i64,
    pub order_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FrequentProductsResponse {
    pub products: Vec<FrequentProduct>,
    pub period: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlySpending {
    /// "2025-12" bucket key.
    pub month: String,
    /// "12月" label.
    pub month_label: String,
    pub total_spend: i64,
    pub order_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyTrendResponse {
    pub months: Vec<MonthlySpending>,
    pub has_data: bool,
}

//! Analytics endpoints: in-process aggregation over fetched order rows.

use actix_web::{web, HttpResponse};
use chrono::{Datelike, Local};
use serde::Deserialize;
use std::collections::HashMap;

use super::models::{
    AnalyticsSummary, FrequentProduct, FrequentProductsResponse, MonthlySpending,
    MonthlyTrendResponse, TopSupplier, TopSuppliersResponse,
};
use super::store::OrderRow;
use super::{japanese_period, month_bounds, parse_timestamp, AnalyticsError};
use crate::{AppState, ErrorResponse};

const UNKNOWN_SUPPLIER: &str = "不明な仕入先";
const ALL_TIME_PERIOD: &str = "全期間";

fn in_current_month(row: &OrderRow) -> bool {
    let today = Local::now().date_naive();
    let (start, end) = month_bounds(today);
    row.created_at
        .as_deref()
        .and_then(parse_timestamp)
        .map(|ts| ts >= start && ts < end)
        .unwrap_or(false)
}

#[utoipa::path(
    context_path = "/api/analytics",
    tag = "Analytics",
    get,
    path = "/summary",
    responses(
        (status = 200, description = "Current-month spending summary", body = AnalyticsSummary),
        (status = 503, description = "Store credentials missing", body = ErrorResponse)
    )
)]
pub async fn summary(state: web::Data<AppState>) -> Result<HttpResponse, AnalyticsError> {
    let rows = state
        .analytics
        .fetch_orders("id,total_amount,supplier_id,created_at", None)
        .await?;

    let this_month: Vec<&OrderRow> = rows.iter().filter(|r| in_current_month(r)).collect();

    let total_spend: i64 = this_month.iter().filter_map(|r| r.total_amount).sum();
    let order_count = this_month.len() as i64;
    let supplier_count = this_month
        .iter()
        .filter_map(|r| r.supplier_id.as_deref())
        .collect::<std::collections::HashSet<_>>()
        .len() as i64;
    let avg_order_value = if order_count > 0 {
        total_spend / order_count
    } else {
        0
    };

    Ok(HttpResponse::Ok().json(AnalyticsSummary {
        total_spend,
        order_count,
        supplier_count,
        avg_order_value,
        period: japanese_period(Local::now().date_naive()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TopSuppliersQuery {
    #[serde(default = "default_supplier_limit")]
    pub limit: usize,
    #[serde(default)]
    pub all_time: bool,
}

fn default_supplier_limit() -> usize {
    5
}

#[utoipa::path(
    context_path = "/api/analytics",
    tag = "Analytics",
    get,
    path = "/top-suppliers",
    responses(
        (status = 200, description = "Suppliers ranked by spend", body = TopSuppliersResponse),
        (status = 503, description = "Store credentials missing", body = ErrorResponse)
    ),
    params(
        ("limit" = Option<usize>, Query, description = "Number of suppliers to return"),
        ("all_time" = Option<bool>, Query, description = "Rank over all orders instead of the current month")
    )
)]
pub async fn top_suppliers(
    query: web::Query<TopSuppliersQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AnalyticsError> {
    let rows = state
        .analytics
        .fetch_orders("id,total_amount,supplier_id,supplier_name,created_at", None)
        .await?;

    let rows: Vec<&OrderRow> = if query.all_time {
        rows.iter().collect()
    } else {
        rows.iter().filter(|r| in_current_month(r)).collect()
    };

    struct Stat {
        name: String,
        total_spend: i64,
        order_count: i64,
    }

    let mut by_supplier: HashMap<String, Stat> = HashMap::new();
    for row in rows {
        let supplier_id = row
            .supplier_id
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        let name = row
            .supplier_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_SUPPLIER.to_string());
        let amount = row.total_amount.unwrap_or(0);

        let stat = by_supplier.entry(supplier_id).or_insert(Stat {
            name: UNKNOWN_SUPPLIER.to_string(),
            total_spend: 0,
            order_count: 0,
        });
        stat.total_spend += amount;
        stat.order_count += 1;
        if name != UNKNOWN_SUPPLIER {
            stat.name = name;
        }
    }

    let mut suppliers: Vec<TopSupplier> = by_supplier
        .into_iter()
        .map(|(supplier_id, stat)| TopSupplier {
            supplier_id,
            name: stat.name,
            total_spend: stat.total_spend,
            order_count: stat.order_count,
        })
        .collect();
    suppliers.sort_by(|a, b| b.total_spend.cmp(&a.total_spend));
    suppliers.truncate(query.limit);

    let period = if query.all_time {
        ALL_TIME_PERIOD.to_string()
    } else {
        japanese_period(Local::now().date_naive())
    };

    Ok(HttpResponse::Ok().json(TopSuppliersResponse { suppliers, period }))
}

#[derive(Debug, Deserialize)]
pub struct FrequentProductsQuery {
    #[serde(default = "default_product_limit")]
    pub limit: usize,
}

fn default_product_limit() -> usize {
    10
}

#[utoipa::path(
    context_path = "/api/analytics",
    tag = "Analytics",
    get,
    path = "/frequent-products",
    responses(
        (status = 200, description = "Products ranked by total quantity", body = FrequentProductsResponse),
        (status = 503, description = "Store credentials missing", body = ErrorResponse)
    ),
    params(
        ("limit" = Option<usize>, Query, description = "Number of products to return")
    )
)]
pub async fn frequent_products(
    query: web::Query<FrequentProductsQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AnalyticsError> {
    let rows = state
        .analytics
        .fetch_order_items("product_name,quantity")
        .await?;

    let mut by_product: HashMap<String, (i64, i64)> = HashMap::new();
    for row in rows {
        let name = row
            .product_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "不明".to_string());
        let quantity = row.quantity.unwrap_or(1).max(1);
        let entry = by_product.entry(name).or_insert((0, 0));
        entry.0 += quantity;
        entry.1 += 1;
    }

    let mut products: Vec<FrequentProduct> = by_product
        .into_iter()
        .map(|(product_name, (total_quantity, order_count))| FrequentProduct {
            product_name,
            total_quantity,
            order_count,
        })
        .collect();
    products.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
    products.truncate(query.limit);

    Ok(HttpResponse::Ok().json(FrequentProductsResponse {
        products,
        period: ALL_TIME_PERIOD.to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct MonthlyTrendQuery {
    #[serde(default = "default_trend_months")]
    pub months: usize,
}

fn default_trend_months() -> usize {
    6
}

#[utoipa::path(
    context_path = "/api/analytics",
    tag = "Analytics",
    get,
    path = "/monthly-trend",
    responses(
        (status = 200, description = "Spending per month, oldest first", body = MonthlyTrendResponse),
        (status = 503, description = "Store credentials missing", body = ErrorResponse)
    ),
    params(
        ("months" = Option<usize>, Query, description = "Maximum number of months to look back")
    )
)]
pub async fn monthly_trend(
    query: web::Query<MonthlyTrendQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AnalyticsError> {
    let rows = state
        .analytics
        .fetch_orders("id,total_amount,created_at", Some("created_at.asc"))
        .await?;

    if rows.is_empty() {
        return Ok(HttpResponse::Ok().json(MonthlyTrendResponse {
            months: Vec::new(),
            has_data: false,
        }));
    }

    let mut by_month: HashMap<String, MonthlySpending> = HashMap::new();
    for row in &rows {
        let Some(ts) = row.created_at.as_deref().and_then(parse_timestamp) else {
            continue;
        };
        let key = format!("{:04}-{:02}", ts.year(), ts.month());
        let bucket = by_month.entry(key.clone()).or_insert(MonthlySpending {
            month: key,
            month_label: format!("{}月", ts.month()),
            total_spend: 0,
            order_count: 0,
        });
        bucket.total_spend += row.total_amount.unwrap_or(0);
        bucket.order_count += 1;
    }

    let mut months: Vec<MonthlySpending> = by_month.into_values().collect();
    months.sort_by(|a, b| a.month.cmp(&b.month));
    if months.len() > query.months {
        months.drain(..months.len() - query.months);
    }

    let has_data = !months.is_empty();
    Ok(HttpResponse::Ok().json(MonthlyTrendResponse { months, has_data }))
}

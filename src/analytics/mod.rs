//! Analytics and dashboard summaries

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Error;
use crate::fetch::ApiClient;
use crate::invoices::Invoice;

/// Revenue series for the chart
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RevenueSeries {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub data: Vec<f64>,
}

/// Invoice counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct StatusBreakdown {
    #[serde(default)]
    pub paid: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub overdue: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientRevenue {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub revenue: f64,
}

/// Response of `GET /analytics`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSnapshot {
    pub total_revenue: f64,
    pub total_invoices: u64,
    pub avg_invoice_value: f64,
    pub revenue_over_time: RevenueSeries,
    pub status_breakdown: StatusBreakdown,
    #[serde(rename = "top5Clients")]
    pub top_clients: Vec<ClientRevenue>,
}

impl AnalyticsSnapshot {
    /// No invoices yet; show the empty state instead of charts
    pub fn is_empty(&self) -> bool {
        self.total_invoices == 0
    }

    pub fn top_client(&self) -> Option<&ClientRevenue> {
        self.top_clients.first()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaidInvoices {
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_invoices: u64,
    pub paid_invoices: PaidInvoices,
    pub total_revenue: f64,
    pub pending_amount: f64,
}

/// The server's view of the signed-in user
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Response of `GET /dashboard`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub recent_activity: Vec<Invoice>,
    pub user_profile: Option<DashboardProfile>,
}

impl DashboardData {
    pub fn has_invoices(&self) -> bool {
        !self.recent_activity.is_empty()
    }
}

/// Client for `/analytics` and `/dashboard`
#[derive(Clone)]
pub struct AnalyticsApi {
    api: ApiClient,
}

impl AnalyticsApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn analytics(&self) -> Result<AnalyticsSnapshot, Error> {
        self.api.get("/analytics").execute().await
    }

    pub async fn dashboard(&self) -> Result<DashboardData, Error> {
        self.api.get("/dashboard").execute().await
    }
}

use serde::{Deserialize, Serialize};

use crate::audit::AuditLog;
use crate::stats::{TripStats, UserStats};
use crate::users::repo::User;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user_stats: UserStats,
    pub trip_stats: TripStats,
}

#[derive(Debug, Serialize)]
pub struct UserListPage {
    pub users: Vec<User>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_users: i64,
}

#[derive(Debug, Serialize)]
pub struct AuditLogPage {
    pub logs: Vec<AuditLog>,
    pub current_page: i64,
    pub total_pages: i64,
}

/// `ceil(total / per_page)` without leaving integer arithmetic.
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    (total + per_page - 1) / per_page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_at_boundaries() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(101, 50), 3);
    }

    #[test]
    fn success_body_matches_contract() {
        let json = serde_json::to_string(&SuccessResponse::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }

    #[test]
    fn page_query_defaults_to_first_page() {
        let q: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
    }
}

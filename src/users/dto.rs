use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::Role;

/// User fields exposed outside the service.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
    pub oauth_providers: Vec<String>,
    pub trip_count: i64,
    pub first_trip: Option<String>,
    pub last_trip: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_serializes_role_and_dates() {
        let profile = ProfileResponse {
            user: PublicUser {
                id: Uuid::new_v4(),
                username: "frank".into(),
                email: "frank@example.com".into(),
                created_at: OffsetDateTime::UNIX_EPOCH,
                role: Role::User,
            },
            oauth_providers: vec!["github".into()],
            trip_count: 2,
            first_trip: Some("2026-01-03".into()),
            last_trip: Some("2026-06-20".into()),
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["user"]["role"], "user");
        assert_eq!(json["user"]["created_at"], "1970-01-01T00:00:00Z");
        assert_eq!(json["oauth_providers"][0], "github");
        assert_eq!(json["trip_count"], 2);
    }
}

use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub goal: i64,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after login, register, demo-login or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub goal: i64,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub goal: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serializes_id_and_username() {
        let user = PublicUser {
            id: 42,
            username: "alice".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"id\":42"));
        assert!(json.contains("alice"));
    }

    #[test]
    fn register_goal_defaults_to_zero() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"bob","password":"longenough"}"#).unwrap();
        assert_eq!(req.goal, 0);
    }
}

use chrono::Duration;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::get_config;
use crate::dto::auth_dto::{AuthResponse, LoginPayload, RegisterPayload, UpdateProfilePayload};
use crate::dto::vendor_dto::VendorSummary;
use crate::error::{Error, Result};
use crate::middleware::auth::TokenKind;
use crate::models::account::{Account, ExperienceLevel, VendorProfile};
use crate::services::catalog_service::load_service_summaries;
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::token::{decode_token, issue_token, issue_token_pair};

/// Columns of [`VendorProfile`]; pair with [`VENDOR_PROFILE_FROM`].
pub(crate) const VENDOR_PROFILE_SELECT: &str = r#"
    SELECT a.id, a.email, a.full_name, a.mobile, a.business, a.experience_level, a.is_online,
           COALESCE(v.is_verified, FALSE) AS is_verified,
           NULLIF(p.location, '') AS location,
           NULLIF(p.city, '') AS city,
           NULLIF(p.state, '') AS state,
           NULLIF(p.pincode, '') AS pincode,
           p.profile_image,
           a.created_at
"#;

pub(crate) const VENDOR_PROFILE_FROM: &str = r#"
    FROM accounts a
    LEFT JOIN profiles p ON p.account_id = a.id
    LEFT JOIN verifications v ON v.account_id = a.id
"#;

/// Pairs each profile with its active service listings, preserving order.
pub(crate) async fn attach_services(
    pool: &PgPool,
    profiles: Vec<VendorProfile>,
) -> Result<Vec<VendorSummary>> {
    let ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();
    let mut services = load_service_summaries(pool, &ids).await?;

    Ok(profiles
        .into_iter()
        .map(|profile| VendorSummary {
            services: services.remove(&profile.id).unwrap_or_default(),
            profile,
        })
        .collect())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the account, its profile and one listing per distinct service
    /// name in a single transaction.
    pub async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse> {
        let email = normalize_email(&payload.email);
        let experience_level = ExperienceLevel::parse_or_default(payload.experience_level.as_deref())
            .map_err(Error::BadRequest)?;
        let password_hash = hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.pool.begin().await?;

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(&email)
                .fetch_one(&mut *tx)
                .await?;
        if taken {
            return Err(Error::Conflict(
                "A vendor with this email already exists".to_string(),
            ));
        }

        let account_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (email, password_hash, full_name, mobile, business, experience_level, is_online)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            RETURNING id
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(payload.full_name.trim())
        .bind(payload.mobile.trim())
        .bind(payload.business.trim())
        .bind(experience_level.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (account_id, location, city, state, pincode)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(account_id)
        .bind(payload.location.as_deref().unwrap_or_default().trim())
        .bind(payload.city.as_deref().unwrap_or_default().trim())
        .bind(payload.state.as_deref().unwrap_or_default().trim())
        .bind(payload.pincode.as_deref().unwrap_or_default().trim())
        .execute(&mut *tx)
        .await?;

        for name in payload.service_names() {
            sqlx::query(
                r#"
                INSERT INTO vendor_services (account_id, service_name, category)
                VALUES ($1, $2, $3)
                ON CONFLICT (account_id, service_name) DO NOTHING
                "#,
            )
            .bind(account_id)
            .bind(&name)
            .bind(payload.business.trim())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(account_id = %account_id, "vendor registered");

        self.authenticated(account_id).await
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse> {
        let email = normalize_email(&payload.email);
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let invalid = || Error::BadRequest("Invalid credentials".to_string());
        let account = account.ok_or_else(invalid)?;
        let account_id = account.id;
        let matches = verify_password(&payload.password, &account.password_hash)
            .map_err(|e| Error::Internal(format!("Stored password hash is unreadable: {}", e)))?;
        if !matches {
            tracing::warn!(account_id = %account_id, "login rejected");
            return Err(invalid());
        }

        self.set_online(account_id, true).await?;
        tracing::info!(account_id = %account_id, "vendor logged in");

        self.authenticated(account_id).await
    }

    pub async fn logout(&self, account_id: Uuid) -> Result<()> {
        self.set_online(account_id, false).await?;
        tracing::info!(account_id = %account_id, "vendor logged out");
        Ok(())
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let config = get_config();
        let claims = decode_token(refresh_token, &config.jwt_secret, TokenKind::Refresh)?;
        let account_id = claims.account_id()?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(Error::Unauthorized("invalid_token".to_string()));
        }

        issue_token(
            account_id,
            TokenKind::Access,
            &config.jwt_secret,
            Duration::minutes(config.access_token_ttl_minutes),
        )
    }

    pub async fn get_profile(&self, account_id: Uuid) -> Result<VendorSummary> {
        let query = format!("{} {} WHERE a.id = $1", VENDOR_PROFILE_SELECT, VENDOR_PROFILE_FROM);
        let profile = sqlx::query_as::<_, VendorProfile>(&query)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Vendor not found".to_string()))?;

        let mut summaries = attach_services(&self.pool, vec![profile]).await?;
        summaries
            .pop()
            .ok_or_else(|| Error::Internal("Profile lookup returned no rows".to_string()))
    }

    /// Applies the provided fields only. Email and id stay untouched.
    pub async fn update_profile(
        &self,
        account_id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<VendorSummary> {
        let experience_level = match payload.experience_level.as_deref() {
            Some(raw) => Some(
                ExperienceLevel::parse_or_default(Some(raw))
                    .map_err(Error::BadRequest)?
                    .as_str(),
            ),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE accounts
            SET full_name = COALESCE($2, full_name),
                mobile = COALESCE($3, mobile),
                business = COALESCE($4, business),
                experience_level = COALESCE($5, experience_level),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(payload.full_name.as_deref().map(str::trim))
        .bind(payload.mobile.as_deref().map(str::trim))
        .bind(payload.business.as_deref().map(str::trim))
        .bind(experience_level)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(Error::NotFound("Vendor not found".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO profiles (account_id, location, city, state, pincode, profile_image)
            VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), COALESCE($4, ''), COALESCE($5, ''), $6)
            ON CONFLICT (account_id) DO UPDATE
            SET location = COALESCE($2, profiles.location),
                city = COALESCE($3, profiles.city),
                state = COALESCE($4, profiles.state),
                pincode = COALESCE($5, profiles.pincode),
                profile_image = COALESCE($6, profiles.profile_image),
                updated_at = NOW()
            "#,
        )
        .bind(account_id)
        .bind(payload.location.as_deref().map(str::trim))
        .bind(payload.city.as_deref().map(str::trim))
        .bind(payload.state.as_deref().map(str::trim))
        .bind(payload.pincode.as_deref().map(str::trim))
        .bind(payload.profile_image.as_deref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(account_id = %account_id, "profile updated");

        self.get_profile(account_id).await
    }

    async fn set_online(&self, account_id: Uuid, online: bool) -> Result<()> {
        let result = sqlx::query(
            "UPDATE accounts SET is_online = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(account_id)
        .bind(online)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Vendor not found".to_string()));
        }
        Ok(())
    }

    async fn authenticated(&self, account_id: Uuid) -> Result<AuthResponse> {
        let config = get_config();
        let tokens = issue_token_pair(
            account_id,
            &config.jwt_secret,
            Duration::minutes(config.access_token_ttl_minutes),
            Duration::days(config.refresh_token_ttl_days),
        )?;
        let vendor = self.get_profile(account_id).await?;

        Ok(AuthResponse {
            vendor,
            access: tokens.access,
            refresh: tokens.refresh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_case_folded() {
        assert_eq!(normalize_email("  Asha@Example.COM "), "asha@example.com");
    }

    #[test]
    fn profile_select_defaults_missing_verification_to_false() {
        assert!(VENDOR_PROFILE_SELECT.contains("COALESCE(v.is_verified, FALSE)"));
        assert!(VENDOR_PROFILE_FROM.contains("LEFT JOIN verifications v"));
    }
}

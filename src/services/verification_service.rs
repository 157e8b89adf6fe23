use std::path::{Path, PathBuf};

use bytes::Bytes;
use sqlx::PgPool;
use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::verification::Verification;

pub const ALLOWED_DOCUMENT_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Identity,
    Tax,
}

impl DocumentKind {
    fn dir_name(&self) -> &'static str {
        match self {
            DocumentKind::Identity => "identity",
            DocumentKind::Tax => "tax",
        }
    }

    /// Multipart field names accepted for each document.
    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "identity_document" | "aadhaar_document" => Some(DocumentKind::Identity),
            "tax_document" | "pan_document" => Some(DocumentKind::Tax),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct VerificationSubmission {
    pub identity_document: Option<DocumentUpload>,
    pub tax_document: Option<DocumentUpload>,
    pub address: Option<String>,
}

/// Checks size, extension and leading magic bytes; returns the lowercase extension.
pub fn validate_document(file_name: &str, data: &[u8], max_bytes: usize) -> Result<String> {
    if data.is_empty() {
        return Err(Error::BadRequest("Uploaded document is empty".to_string()));
    }
    if data.len() > max_bytes {
        return Err(Error::BadRequest(format!(
            "Document exceeds the {} byte limit",
            max_bytes
        )));
    }

    let ext = Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "Document type not allowed. Allowed: {}",
            ALLOWED_DOCUMENT_EXTENSIONS.join(", ")
        )));
    }

    let content_ok = match ext.as_str() {
        "pdf" => data.starts_with(b"%PDF"),
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        _ => false,
    };
    if !content_ok {
        return Err(Error::BadRequest(format!("Invalid {} file content", ext.to_uppercase())));
    }

    Ok(ext)
}

#[derive(Clone)]
pub struct VerificationService {
    pool: PgPool,
    uploads_dir: PathBuf,
    max_upload_bytes: usize,
}

impl VerificationService {
    pub fn new(pool: PgPool, uploads_dir: impl Into<PathBuf>, max_upload_bytes: usize) -> Self {
        Self {
            pool,
            uploads_dir: uploads_dir.into(),
            max_upload_bytes,
        }
    }

    pub async fn get(&self, account_id: Uuid) -> Result<Verification> {
        sqlx::query_as::<_, Verification>("SELECT * FROM verifications WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("No verification submitted".to_string()))
    }

    /// Writes the file under `<uploads>/documents/<kind>/` and returns the
    /// path relative to the uploads root.
    pub async fn store_document(&self, kind: DocumentKind, upload: &DocumentUpload) -> Result<String> {
        let ext = validate_document(&upload.file_name, &upload.data, self.max_upload_bytes)?;

        let relative = format!("documents/{}/{}.{}", kind.dir_name(), Uuid::new_v4(), ext);
        let path = self.uploads_dir.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &upload.data).await.map_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "failed to write verification document");
            Error::Io(e)
        })?;

        Ok(relative)
    }

    /// Creates the record on first submission and updates it in place after.
    /// Submissions are approved immediately. Returns whether a row was created.
    pub async fn submit(
        &self,
        account_id: Uuid,
        submission: VerificationSubmission,
    ) -> Result<(Verification, bool)> {
        let mut stored: Vec<String> = Vec::new();
        let result = self.submit_inner(account_id, submission, &mut stored).await;
        if result.is_err() {
            for relative in &stored {
                if let Err(e) = fs::remove_file(self.uploads_dir.join(relative)).await {
                    tracing::warn!(error = %e, file = %relative, "failed to clean up rejected upload");
                }
            }
        }
        result
    }

    async fn submit_inner(
        &self,
        account_id: Uuid,
        submission: VerificationSubmission,
        stored: &mut Vec<String>,
    ) -> Result<(Verification, bool)> {
        let identity = match &submission.identity_document {
            Some(upload) => {
                let path = self.store_document(DocumentKind::Identity, upload).await?;
                stored.push(path.clone());
                Some(path)
            }
            None => None,
        };
        let tax = match &submission.tax_document {
            Some(upload) => {
                let path = self.store_document(DocumentKind::Tax, upload).await?;
                stored.push(path.clone());
                Some(path)
            }
            None => None,
        };
        let address = submission.address.as_deref().map(str::trim);

        let mut tx = self.pool.begin().await?;

        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM verifications WHERE account_id = $1 FOR UPDATE")
                .bind(account_id)
                .fetch_optional(&mut *tx)
                .await?;

        let inserted = match existing {
            Some(_) => None,
            None => {
                let (Some(identity), Some(tax)) = (identity.as_deref(), tax.as_deref()) else {
                    return Err(Error::BadRequest(
                        "Both identity_document and tax_document are required".to_string(),
                    ));
                };
                // A concurrent first submission may have committed since the
                // lookup; that row is then updated below instead.
                sqlx::query_as::<_, Verification>(
                    r#"
                    INSERT INTO verifications (account_id, identity_document, tax_document, address, status, is_verified, reviewed_at)
                    VALUES ($1, $2, $3, COALESCE($4, ''), 'approved', TRUE, NOW())
                    ON CONFLICT (account_id) DO NOTHING
                    RETURNING *
                    "#,
                )
                .bind(account_id)
                .bind(identity)
                .bind(tax)
                .bind(address)
                .fetch_optional(&mut *tx)
                .await?
            }
        };

        let (verification, created) = match inserted {
            Some(verification) => (verification, true),
            None => {
                let verification = sqlx::query_as::<_, Verification>(
                    r#"
                    UPDATE verifications
                    SET identity_document = COALESCE($2, identity_document),
                        tax_document = COALESCE($3, tax_document),
                        address = COALESCE($4, address),
                        status = 'approved',
                        is_verified = TRUE,
                        submitted_at = NOW(),
                        reviewed_at = NOW()
                    WHERE account_id = $1
                    RETURNING *
                    "#,
                )
                .bind(account_id)
                .bind(identity.as_deref())
                .bind(tax.as_deref())
                .bind(address)
                .fetch_one(&mut *tx)
                .await?;
                (verification, false)
            }
        };

        tx.commit().await?;
        tracing::info!(account_id = %account_id, created, "verification submitted and approved");

        Ok((verification, created))
    }
}

//! Betclic account API: login handshake and paginated movement history.
//!
//! Pages come newest first. Paging stops at the first empty page or at the
//! first movement older than the caller's cut-off (the latest entry already
//! stored locally). Stamps only carry minutes, so the cut-off minute itself is
//! fetched again and left to the ledger merge to deduplicate.

use async_trait::async_trait;
use betstats_core::RawTransactionRecord;
use chrono::NaiveDateTime;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::IngestError;
use crate::types::{AuthenticatedSession, ClientInfo, LoginRequest, LoginResponse, RequestContext};

pub const URL_LOGIN: &str = "https://apif.begmedia.com/api/v1/account/auth/logins";
pub const URL_TRANSACTIONS: &str = "https://globalapi.begmedia.com/api/Transactions/mvts";
const PAGE_SIZE: u32 = 20;
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:87.0) Gecko/20100101 Firefox/87.0";

/// Anything able to hand back the movements of one account.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Fetch movements from `until` onwards (everything when `None`).
    ///
    /// Movements stamped at `until` itself are returned too.
    async fn fetch_since(
        &self,
        ctx: &RequestContext,
        until: Option<NaiveDateTime>,
    ) -> Result<Vec<RawTransactionRecord>, IngestError>;
}

pub struct BetclicClient {
    client: Client,
    login_url: String,
    transactions_url: String,
}

impl BetclicClient {
    pub fn new() -> Result<Self, IngestError> {
        Self::with_urls(URL_LOGIN, URL_TRANSACTIONS)
    }

    pub fn with_urls(
        login_url: impl Into<String>,
        transactions_url: impl Into<String>,
    ) -> Result<Self, IngestError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Origin", HeaderValue::from_static("https://www.betclic.fr"));
        headers.insert(
            "Referer",
            HeaderValue::from_static("https://www.betclic.fr/"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            login_url: login_url.into(),
            transactions_url: transactions_url.into(),
        })
    }

    pub async fn authenticate(
        &self,
        ctx: &RequestContext,
    ) -> Result<AuthenticatedSession, IngestError> {
        let body = LoginRequest {
            birthdate: format!("{}T00:00:00.000Z", ctx.birthday),
            client_info: ClientInfo::default(),
            fingerprint: Uuid::new_v4().to_string(),
            login: &ctx.login,
            password: &ctx.password,
        };

        let resp = self.client.post(&self.login_url).json(&body).send().await?;
        let res: LoginResponse = check_status(resp).await?.json().await?;
        if res.status != "Validated" {
            return Err(IngestError::AuthRejected(res.status));
        }

        debug!(login = %ctx.login, "login validated");
        Ok(AuthenticatedSession {
            client_header: res.token.to_string(),
        })
    }

    async fn fetch_page(
        &self,
        session: &AuthenticatedSession,
        page: u32,
    ) -> Result<Vec<serde_json::Value>, IngestError> {
        let resp = self
            .client
            .get(&self.transactions_url)
            .header("X-CLIENT", &session.client_header)
            .query(&[
                ("filter", "All".to_string()),
                ("page", page.to_string()),
                ("pageSize", PAGE_SIZE.to_string()),
            ])
            .send()
            .await?;

        Ok(check_status(resp).await?.json().await?)
    }
}

#[async_trait]
impl TransactionSource for BetclicClient {
    async fn fetch_since(
        &self,
        ctx: &RequestContext,
        until: Option<NaiveDateTime>,
    ) -> Result<Vec<RawTransactionRecord>, IngestError> {
        let session = self.authenticate(ctx).await?;
        let session = &session;

        let (out, pages) = collect_pages(|page| self.fetch_page(session, page), until).await?;

        info!(login = %ctx.login, pages, new = out.len(), "fetched transactions");
        Ok(out)
    }
}

/// Request pages from 1 upwards until one comes back empty or crosses `until`.
///
/// Returns the records and the number of pages requested.
pub(crate) async fn collect_pages<F, Fut>(
    mut fetch: F,
    until: Option<NaiveDateTime>,
) -> Result<(Vec<RawTransactionRecord>, u32), IngestError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<serde_json::Value>, IngestError>>,
{
    let mut out = Vec::new();
    let mut page = 1;
    loop {
        let items = fetch(page).await?;
        let decoded = decode_page(page, items, until)?;
        debug!(page, count = decoded.records.len(), "fetched page");

        let done = decoded.records.is_empty() || decoded.reached_cutoff;
        out.extend(decoded.records);
        if done {
            return Ok((out, page));
        }
        page += 1;
    }
}

async fn check_status(resp: Response) -> Result<Response, IngestError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(IngestError::Status {
            url: resp.url().to_string(),
            status,
        });
    }
    Ok(resp)
}

#[derive(Debug, Default)]
pub(crate) struct DecodedPage {
    pub records: Vec<RawTransactionRecord>,
    pub reached_cutoff: bool,
}

/// Validate one page of raw JSON objects into typed records.
pub(crate) fn decode_page(
    page: u32,
    items: Vec<serde_json::Value>,
    until: Option<NaiveDateTime>,
) -> Result<DecodedPage, IngestError> {
    let mut out = DecodedPage::default();

    for (index, item) in items.into_iter().enumerate() {
        let record: RawTransactionRecord = serde_json::from_value(item)
            .map_err(|source| IngestError::Decode { page, index, source })?;
        let date = record
            .parsed_date()
            .map_err(|source| IngestError::Invalid { page, index, source })?;
        record
            .validate()
            .map_err(|source| IngestError::Invalid { page, index, source })?;

        if until.is_some_and(|cutoff| date < cutoff) {
            out.reached_cutoff = true;
            break;
        }
        out.records.push(record);
    }

    Ok(out)
}

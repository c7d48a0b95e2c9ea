//! Conformity public API client (reqwest-based).
//!
//! Wraps `reqwest::Client` with the JSON:API conventions of the Conformity
//! endpoints, API-key authentication, retry with exponential backoff, and
//! typed parsing into the `conformity-api` entity model.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use conformity_api::models::{
    Account, AccountDetails, Check, CommunicationSetting, Group, Note, Profile, ReportConfig,
    Rule, User,
};
use conformity_api::wire::{attributes_envelope, data_array, data_of, CollectionDocument};

use crate::auth::ApiAuth;
use crate::error::{ApiClientError, ApiResult};
use crate::pager::CollectionPager;
use crate::retry::RetryPolicy;

/// HTTP client for one Conformity deployment (legacy or Cloud One).
///
/// Cloning is cheap; all clones share the underlying connection pool and the
/// memoized organisation external id.
#[derive(Debug, Clone)]
pub struct ConformityClient {
    base_url: String,
    auth: ApiAuth,
    http_client: Client,
    retry: RetryPolicy,
    org_external_id: Arc<Mutex<Option<String>>>,
}

impl ConformityClient {
    /// Create a new client.
    pub fn new(
        base_url: String,
        auth: ApiAuth,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> ApiResult<Self> {
        let http_client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .user_agent("conformity-migration/1.0")
            .build()
            .map_err(|e| {
                ApiClientError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(base_url, auth, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(base_url: String, auth: ApiAuth, http_client: Client) -> Self {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Self {
            base_url,
            auth,
            http_client,
            retry: RetryPolicy::default(),
            org_external_id: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the default retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Organisation ──────────────────────────────────────────────────

    /// The organisation's AWS external id, fetched once and memoized for
    /// the lifetime of this client (and its clones).
    pub async fn get_organisation_external_id(&self) -> ApiResult<String> {
        {
            let cached = self
                .org_external_id
                .lock()
                .map_err(|_| ApiClientError::InvalidConfig("external-id cache poisoned".into()))?;
            if let Some(id) = cached.as_ref() {
                return Ok(id.clone());
            }
        }
        let url = format!("{}/organisation/external-id", self.base_url);
        let res: Value = self.get("get_organisation_external_id", &url).await?;
        let id = res
            .pointer("/data/id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ApiClientError::ParseError("external-id response missing data.id".into())
            })?
            .to_string();
        let mut cached = self
            .org_external_id
            .lock()
            .map_err(|_| ApiClientError::InvalidConfig("external-id cache poisoned".into()))?;
        *cached = Some(id.clone());
        Ok(id)
    }

    /// The organisation id, taken from the first user's organisation
    /// relationship (there is no dedicated endpoint for it).
    pub async fn get_organisation_id(&self) -> ApiResult<String> {
        let url = format!("{}/users", self.base_url);
        let res: Value = self.get("get_organisation_id", &url).await?;
        res.pointer("/data/0/relationships/organisation/data/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ApiClientError::ParseError("users response missing organisation id".into())
            })
    }

    // ── Accounts ──────────────────────────────────────────────────────

    pub async fn list_accounts(&self) -> ApiResult<Vec<Account>> {
        let url = format!("{}/accounts", self.base_url);
        let res: Value = self.get("list_accounts", &url).await?;
        collection_data(&res)
            .iter()
            .map(|a| Account::from_resource(a).map_err(Into::into))
            .collect()
    }

    pub async fn get_account_details(&self, acct_id: &str) -> ApiResult<AccountDetails> {
        let url = format!("{}/accounts/{}", self.base_url, acct_id);
        let res: Value = self.get("get_account_details", &url).await?;
        let data = data_of(&res)
            .ok_or_else(|| ApiClientError::ParseError("account response missing data".into()))?;
        Ok(AccountDetails::from_resource(data)?)
    }

    /// The role ARN / external id pair the account was onboarded with.
    pub async fn get_account_access_configuration(&self, acct_id: &str) -> ApiResult<Value> {
        let url = format!("{}/accounts/{}/access", self.base_url, acct_id);
        let res: Value = self.get("get_account_access_configuration", &url).await?;
        res.pointer("/attributes/configuration")
            .cloned()
            .ok_or_else(|| {
                ApiClientError::ParseError("access response missing configuration".into())
            })
    }

    /// Register an AWS account on this organisation.
    pub async fn add_aws_account(
        &self,
        name: &str,
        environment: &str,
        role_arn: &str,
        external_id: &str,
    ) -> ApiResult<Value> {
        let url = format!("{}/accounts", self.base_url);
        let body = json!({
            "data": {
                "attributes": {
                    "name": name,
                    "environment": environment,
                    "access": {
                        "keys": { "roleArn": role_arn, "externalId": external_id }
                    },
                    "subscriptionType": "advanced",
                },
            }
        });
        let res: Value = self.post("add_aws_account", &url, &body).await?;
        Ok(res.get("data").cloned().unwrap_or(Value::Null))
    }

    /// Register an Azure subscription on this organisation.
    pub async fn add_azure_subscription(
        &self,
        name: &str,
        environment: &str,
        subscription_id: &str,
        active_directory_id: &str,
    ) -> ApiResult<Value> {
        let url = format!("{}/accounts/azure", self.base_url);
        let body = json!({
            "data": {
                "attributes": {
                    "name": name,
                    "environment": environment,
                    "access": {
                        "subscriptionId": subscription_id,
                        "activeDirectoryId": active_directory_id,
                    },
                },
            }
        });
        let res: Value = self.post("add_azure_subscription", &url, &body).await?;
        Ok(res.get("data").cloned().unwrap_or(Value::Null))
    }

    pub async fn create_azure_directory(
        &self,
        name: &str,
        directory_id: &str,
        app_client_id: &str,
        app_client_key: &str,
    ) -> ApiResult<Value> {
        let url = format!("{}/azure/active-directories", self.base_url);
        let body = json!({
            "data": {
                "attributes": {
                    "name": name,
                    "directoryId": directory_id,
                    "applicationId": app_client_id,
                    "applicationKey": app_client_key,
                }
            }
        });
        let res: Value = self.post("create_azure_directory", &url, &body).await?;
        Ok(res.get("data").cloned().unwrap_or(Value::Null))
    }

    /// Update an account's name, environment and tags.
    pub async fn update_account(
        &self,
        acct_id: &str,
        name: &str,
        environment: &str,
        tags: &[String],
    ) -> ApiResult<Value> {
        let url = format!("{}/accounts/{}", self.base_url, acct_id);
        let body = json!({
            "data": {
                "attributes": { "name": name, "environment": environment, "tags": tags },
            },
        });
        self.patch("update_account", &url, &body).await
    }

    // ── Bot settings ──────────────────────────────────────────────────

    pub async fn get_account_bot_settings(&self, acct_id: &str) -> ApiResult<Value> {
        let url = format!("{}/accounts/{}/settings/bot", self.base_url, acct_id);
        let res: Value = self.get("get_account_bot_settings", &url).await?;
        res.pointer("/data/attributes/settings/bot")
            .cloned()
            .ok_or_else(|| {
                ApiClientError::ParseError("bot settings response missing settings.bot".into())
            })
    }

    pub async fn update_account_bot_settings(
        &self,
        acct_id: &str,
        settings: &Value,
    ) -> ApiResult<Value> {
        let url = format!("{}/accounts/{}/settings/bot", self.base_url, acct_id);
        let body = json!({
            "data": { "attributes": { "settings": { "bot": settings } } },
        });
        self.patch("update_account_bot_settings", &url, &body).await
    }

    /// Whether the account's bot has no scan in flight.
    pub async fn is_bot_scan_done(&self, acct_id: &str) -> ApiResult<bool> {
        let details = self.get_account_details(acct_id).await?;
        Ok(details.bot_status.is_none())
    }

    // ── Rule settings ─────────────────────────────────────────────────

    /// All rule settings configured on an account.  Accounts that were
    /// never configured return 404 here, which is reported as an empty
    /// list rather than an error.
    pub async fn get_account_rules_settings(&self, acct_id: &str) -> ApiResult<Vec<Value>> {
        let url = format!("{}/accounts/{}/settings/rules", self.base_url, acct_id);
        let res: Value = match self.get("get_account_rules_settings", &url).await {
            Ok(res) => res,
            Err(ApiClientError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(res
            .pointer("/data/attributes/settings/rules")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// One rule's setting on an account, optionally with its note history.
    pub async fn get_account_rule_setting(
        &self,
        acct_id: &str,
        rule_id: &str,
        with_notes: bool,
    ) -> ApiResult<Rule> {
        let url = format!(
            "{}/accounts/{}/settings/rules/{}",
            self.base_url, acct_id, rule_id
        );
        let params = [("notes".to_string(), with_notes.to_string())];
        let res: Value = self
            .get_with_params("get_account_rule_setting", &url, &params)
            .await?;
        let setting = res
            .pointer("/data/attributes/settings/rules/0")
            .cloned()
            .ok_or_else(|| {
                ApiClientError::ParseError("rule setting response missing settings.rules".into())
            })?;
        let mut notes = Vec::new();
        if with_notes {
            // Older deployments nest the notes under meta.deprecation.
            let ns = res
                .pointer("/meta/notes")
                .or_else(|| res.pointer("/meta/deprecation/notes"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            notes = ns.iter().filter_map(Note::from_value).collect();
        }
        Ok(Rule::new(setting, notes)?)
    }

    pub async fn update_account_rule_setting(
        &self,
        acct_id: &str,
        rule_id: &str,
        setting: &Value,
        note: &str,
    ) -> ApiResult<Value> {
        let url = format!(
            "{}/accounts/{}/settings/rules/{}",
            self.base_url, acct_id, rule_id
        );
        let body = json!({
            "data": { "attributes": { "ruleSetting": setting, "note": note } },
        });
        let res: Value = self.patch("update_account_rule_setting", &url, &body).await?;
        Ok(res.get("data").cloned().unwrap_or(Value::Null))
    }

    // ── Groups ────────────────────────────────────────────────────────

    /// List groups, optionally restricted to the given group types.
    pub async fn list_groups(&self, include_group_types: &[&str]) -> ApiResult<Vec<Group>> {
        let url = format!("{}/groups", self.base_url);
        let res: Value = self.get("list_groups", &url).await?;
        let mut groups = Vec::new();
        for g in collection_data(&res) {
            let group = Group::from_resource(g)?;
            if !include_group_types.is_empty()
                && !include_group_types.contains(&group.group_type.as_str())
            {
                continue;
            }
            groups.push(group);
        }
        Ok(groups)
    }

    /// One group's raw resource.  The endpoint wraps the group in a
    /// one-element collection.
    pub async fn get_group_details(&self, group_id: &str) -> ApiResult<Value> {
        let url = format!("{}/groups/{}", self.base_url, group_id);
        let res: Value = self.get("get_group_details", &url).await?;
        res.pointer("/data/0")
            .cloned()
            .ok_or_else(|| ApiClientError::ParseError("group response missing data".into()))
    }

    pub async fn create_group(&self, name: &str, tags: &[String]) -> ApiResult<Value> {
        let url = format!("{}/groups", self.base_url);
        let body = attributes_envelope(json!({ "name": name, "tags": tags }));
        let res: Value = self.post("create_group", &url, &body).await?;
        Ok(res.get("data").cloned().unwrap_or(Value::Null))
    }

    // ── Users ─────────────────────────────────────────────────────────

    /// All users with a real email address.  API-key pseudo-users have no
    /// email and are skipped.
    pub async fn get_all_users(&self) -> ApiResult<Vec<User>> {
        let res = self.list_all_users().await?;
        Ok(res.iter().filter_map(User::from_resource).collect())
    }

    /// Raw user resources, including the ones `get_all_users` skips.
    pub async fn list_all_users(&self) -> ApiResult<Vec<Value>> {
        let url = format!("{}/users", self.base_url);
        let res: Value = self.get("list_all_users", &url).await?;
        Ok(data_array(&res))
    }

    /// Invite a user into this organisation, copying role and (for plain
    /// users) the account access list from the given source resource.
    pub async fn invite_user(&self, user_resource: &Value) -> ApiResult<Value> {
        let attrib = user_resource.get("attributes").cloned().unwrap_or(Value::Null);
        let role = attrib.get("role").and_then(Value::as_str).unwrap_or("USER");
        let mut attributes = json!({
            "firstName": attrib.get("first-name").cloned().unwrap_or(Value::Null),
            "lastName": attrib.get("last-name").cloned().unwrap_or(Value::Null),
            "email": attrib.get("email").cloned().unwrap_or(Value::Null),
            "role": role,
        });
        if role == "USER" {
            if let Some(access_list) = user_resource.pointer("/relationships/accountAccessList") {
                attributes["accessList"] = access_list.clone();
            }
        }
        let url = format!("{}/users", self.base_url);
        let body = attributes_envelope(attributes);
        let res: Value = self.post("invite_user", &url, &body).await?;
        Ok(res.get("data").cloned().unwrap_or(Value::Null))
    }

    // ── Communication settings ────────────────────────────────────────

    /// Communication settings scoped to one account, or the
    /// organisation-level settings when `acct_id` is `None`.
    pub async fn get_communication_settings(
        &self,
        acct_id: Option<&str>,
    ) -> ApiResult<Vec<CommunicationSetting>> {
        let url = format!("{}/settings/communication", self.base_url);
        let params = match acct_id {
            Some(id) => [("accountId".to_string(), id.to_string())],
            None => [("includeParents".to_string(), "true".to_string())],
        };
        let res: Value = self
            .get_with_params("get_communication_settings", &url, &params)
            .await?;
        Ok(collection_data(&res)
            .iter()
            .filter_map(CommunicationSetting::from_resource)
            .collect())
    }

    /// Create communication settings under the given organisation, scoped
    /// to an account when `acct_id` is given.  Settings with no channel
    /// configuration are skipped.
    pub async fn create_communication_settings(
        &self,
        com_settings: &[CommunicationSetting],
        acct_id: Option<&str>,
        org_id: &str,
    ) -> ApiResult<Value> {
        let mut settings = Vec::new();
        for cs in com_settings {
            if cs.configuration.is_none() {
                continue;
            }
            let account_data = match acct_id {
                Some(id) => json!({ "type": "accounts", "id": id }),
                None => Value::Null,
            };
            settings.push(json!({
                "type": "settings",
                "attributes": {
                    "type": "communication",
                    "enabled": cs.enabled,
                    "channel": cs.channel,
                    "filter": cs.filter.clone().unwrap_or(Value::Null),
                    "configuration": cs.configuration.clone().unwrap_or(Value::Null),
                },
                "relationships": {
                    "account": { "data": account_data },
                    "organisation": {
                        "data": { "type": "organisations", "id": org_id }
                    },
                },
            }));
        }
        let url = format!("{}/settings/communication", self.base_url);
        let body = json!({ "data": settings });
        self.post("create_communication_settings", &url, &body).await
    }

    // ── Checks ────────────────────────────────────────────────────────

    /// Lazily page through an account's checks.  `limit` of 0 means
    /// unlimited; a positive limit also shrinks the page size so a small
    /// read issues a single small request.
    #[must_use]
    pub fn checks_pager(
        &self,
        acct_id: &str,
        filters: &[(&str, &str)],
        limit: usize,
    ) -> CollectionPager {
        let mut params = vec![("accountIds".to_string(), acct_id.to_string())];
        for (name, value) in filters {
            params.push((format!("filter[{name}]"), (*value).to_string()));
        }
        CollectionPager::new(self.clone(), "/checks".to_string(), params, limit)
    }

    /// All suppressed checks on an account.
    pub async fn get_suppressed_checks(
        &self,
        acct_id: &str,
        limit: usize,
    ) -> ApiResult<Vec<Check>> {
        let filters = [("suppressed", "true"), ("suppressedFilterMode", "v2")];
        let mut pager = self.checks_pager(acct_id, &filters, limit);
        let mut checks = Vec::new();
        while let Some(resource) = pager.try_next().await? {
            checks.push(Check::from_resource(&resource)?);
        }
        Ok(checks)
    }

    /// One check with its full attribute set, optionally with notes.
    pub async fn get_check_detail(
        &self,
        check_id: &str,
        with_notes: bool,
        notes_limit: usize,
    ) -> ApiResult<Check> {
        let notes_limit = if notes_limit > 0 && notes_limit < 100 {
            notes_limit
        } else {
            100
        };
        let url = format!(
            "{}/checks/{}",
            self.base_url,
            urlencoding::encode(check_id)
        );
        let mut params = vec![("filter[notes]".to_string(), with_notes.to_string())];
        if with_notes {
            params.push(("filter[notesLength]".to_string(), notes_limit.to_string()));
        }
        let res: Value = self
            .get_with_params("get_check_detail", &url, &params)
            .await?;
        let data = res
            .get("data")
            .ok_or_else(|| ApiClientError::ParseError("check response missing data".into()))?;
        Ok(Check::from_resource(data)?)
    }

    /// Suppress a check, with an audit note.
    pub async fn suppress_check(
        &self,
        check_id: &str,
        suppressed_until: Option<i64>,
        note: &str,
    ) -> ApiResult<Value> {
        let url = format!(
            "{}/checks/{}",
            self.base_url,
            urlencoding::encode(check_id)
        );
        let body = json!({
            "data": {
                "type": "checks",
                "attributes": {
                    "suppressed": true,
                    "suppressed-until": suppressed_until,
                },
            },
            "meta": { "note": note },
        });
        let res: Value = self.patch("suppress_check", &url, &body).await?;
        Ok(res.get("data").cloned().unwrap_or(Value::Null))
    }

    // ── Profiles ──────────────────────────────────────────────────────

    pub async fn get_custom_profiles(&self) -> ApiResult<Vec<Profile>> {
        let url = format!("{}/profiles", self.base_url);
        let res: Value = self.get("get_custom_profiles", &url).await?;
        collection_data(&res)
            .iter()
            .map(|p| Profile::new(json!({ "data": p })).map_err(Into::into))
            .collect()
    }

    pub async fn get_profile(
        &self,
        profile_id: &str,
        include_rule_settings: bool,
    ) -> ApiResult<Profile> {
        let url = format!("{}/profiles/{}", self.base_url, profile_id);
        let res: Value = if include_rule_settings {
            let params = [("includes".to_string(), "ruleSettings".to_string())];
            self.get_with_params("get_profile", &url, &params).await?
        } else {
            self.get("get_profile", &url).await?
        };
        Ok(Profile::new(res)?)
    }

    /// The organisation-wide profile, addressed as `organisation-<org-id>`.
    pub async fn get_organisation_profile(
        &self,
        include_rule_settings: bool,
    ) -> ApiResult<Profile> {
        let profile_id = self.org_profile_id().await?;
        self.get_profile(&profile_id, include_rule_settings).await
    }

    pub async fn update_organisation_profile(&self, profile: &Profile) -> ApiResult<Profile> {
        let profile_id = self.org_profile_id().await?;
        let mut doc = profile.portable_document();
        doc["data"]["id"] = Value::String(profile_id.clone());
        let url = format!("{}/profiles/{}", self.base_url, profile_id);
        let res: Value = self.patch("update_organisation_profile", &url, &doc).await?;
        Ok(Profile::new(res)?)
    }

    pub async fn create_profile(&self, profile: &Profile) -> ApiResult<Profile> {
        let url = format!("{}/profiles", self.base_url);
        let doc = profile.portable_document();
        let res: Value = self.post("create_profile", &url, &doc).await?;
        Ok(Profile::new(res)?)
    }

    pub async fn delete_profile(&self, profile_id: &str) -> ApiResult<Value> {
        let url = format!("{}/profiles/{}", self.base_url, profile_id);
        self.delete("delete_profile", &url).await
    }

    async fn org_profile_id(&self) -> ApiResult<String> {
        Ok(format!("organisation-{}", self.get_organisation_id().await?))
    }

    // ── Report configs ────────────────────────────────────────────────

    pub async fn list_organisation_report_configs(&self) -> ApiResult<Vec<ReportConfig>> {
        self.list_report_configs(&[]).await
    }

    pub async fn list_group_report_configs(&self, group_id: &str) -> ApiResult<Vec<ReportConfig>> {
        let params = [("groupId".to_string(), group_id.to_string())];
        self.list_report_configs(&params).await
    }

    pub async fn list_account_report_configs(&self, acct_id: &str) -> ApiResult<Vec<ReportConfig>> {
        let params = [("accountId".to_string(), acct_id.to_string())];
        self.list_report_configs(&params).await
    }

    async fn list_report_configs(&self, params: &[(String, String)]) -> ApiResult<Vec<ReportConfig>> {
        let url = format!("{}/report-configs", self.base_url);
        let res: Value = self
            .get_with_params("list_report_configs", &url, params)
            .await?;
        collection_data(&res)
            .iter()
            .map(|r| ReportConfig::from_resource(r).map_err(Into::into))
            .collect()
    }

    pub async fn create_organisation_report_config(
        &self,
        configuration: &Value,
    ) -> ApiResult<Value> {
        self.create_report_config(configuration, None, None).await
    }

    pub async fn create_group_report_config(
        &self,
        configuration: &Value,
        group_id: &str,
    ) -> ApiResult<Value> {
        self.create_report_config(configuration, None, Some(group_id))
            .await
    }

    pub async fn create_account_report_config(
        &self,
        configuration: &Value,
        acct_id: &str,
    ) -> ApiResult<Value> {
        self.create_report_config(configuration, Some(acct_id), None)
            .await
    }

    async fn create_report_config(
        &self,
        configuration: &Value,
        acct_id: Option<&str>,
        group_id: Option<&str>,
    ) -> ApiResult<Value> {
        let mut attributes = json!({ "configuration": configuration });
        if let Some(acct_id) = acct_id {
            attributes["accountId"] = Value::String(acct_id.to_string());
        } else if let Some(group_id) = group_id {
            attributes["groupId"] = Value::String(group_id.to_string());
        }
        let url = format!("{}/report-configs", self.base_url);
        let body = attributes_envelope(attributes);
        let res: Value = self.post("create_report_config", &url, &body).await?;
        Ok(res.get("data").cloned().unwrap_or(Value::Null))
    }

    pub async fn delete_report_config(&self, report_conf_id: &str) -> ApiResult<Value> {
        let url = format!("{}/report-configs/{}", self.base_url, report_conf_id);
        self.delete("delete_report_config", &url).await
    }

    // ── Paging support ────────────────────────────────────────────────

    pub(crate) async fn fetch_collection_page(
        &self,
        path: &str,
        params: &[(String, String)],
        page_number: u64,
        page_size: u64,
    ) -> ApiResult<CollectionDocument> {
        let url = format!("{}{}", self.base_url, path);
        let mut params = params.to_vec();
        params.push(("page[size]".to_string(), page_size.to_string()));
        params.push(("page[number]".to_string(), page_number.to_string()));
        self.get_with_params("fetch_collection_page", &url, &params)
            .await
    }

    // ── Internal HTTP methods ─────────────────────────────────────────

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
    ) -> ApiResult<T> {
        self.get_with_params(operation, url, &[]).await
    }

    async fn get_with_params<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        params: &[(String, String)],
    ) -> ApiResult<T> {
        self.retry
            .execute(operation, || async {
                debug!("GET {} (params={:?})", url, params);
                let mut builder = self.http_client.get(url);
                if !params.is_empty() {
                    builder = builder.query(params);
                }
                let response = self.auth.apply(builder).send().await?;
                handle_response(response).await
            })
            .await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        body: &Value,
    ) -> ApiResult<T> {
        self.retry
            .execute(operation, || async {
                debug!("POST {}", url);
                let builder = self.http_client.post(url).json(body);
                let response = self.auth.apply(builder).send().await?;
                handle_response(response).await
            })
            .await
    }

    async fn patch<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        body: &Value,
    ) -> ApiResult<T> {
        self.retry
            .execute(operation, || async {
                debug!("PATCH {}", url);
                let builder = self.http_client.patch(url).json(body);
                let response = self.auth.apply(builder).send().await?;
                handle_response(response).await
            })
            .await
    }

    async fn delete(&self, operation: &str, url: &str) -> ApiResult<Value> {
        self.retry
            .execute(operation, || async {
                debug!("DELETE {}", url);
                let builder = self.http_client.delete(url);
                let response = self.auth.apply(builder).send().await?;
                let status = response.status();
                if status == StatusCode::NO_CONTENT {
                    return Ok(Value::Null);
                }
                handle_response(response).await
            })
            .await
    }
}

fn collection_data(res: &Value) -> &[Value] {
    res.get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

// ── Response handling ─────────────────────────────────────────────────

async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> ApiResult<T> {
    let status = response.status();
    if status.is_success() {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiClientError::ParseError(format!("Failed to parse response: {e}")))
    } else {
        handle_error_response(response).await
    }
}

async fn handle_error_response<T>(response: reqwest::Response) -> ApiResult<T> {
    let status = response.status();

    let retry_after = response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());

    match status {
        StatusCode::NOT_FOUND => Err(ApiClientError::NotFound(body)),
        StatusCode::CONFLICT => Err(ApiClientError::Conflict(body)),
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("API rate limited, retry after {:?}s", retry_after);
            Err(ApiClientError::RateLimited {
                retry_after_secs: retry_after,
            })
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiClientError::AuthError(
            format!("Authentication failed ({}): {body}", status.as_u16()),
        )),
        _ => {
            let detail = if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body
            };
            Err(ApiClientError::ApiError {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

//! Jira REST v2 client.
//!
//! The downstream project carries custom fields (target release, upstream
//! link, customer and security data) that the upstream project does not;
//! `JiraConfig::custom_fields` controls whether they are parsed.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{TrackerError, TrackerResult};
use crate::issue::{CustomerPriority, Issue, IssueState, IssueType, NewIssue, SecurityImpact};
use crate::loader::{default_workers, load_pages, DEFAULT_PAGE_SIZE};
use crate::tracker::IssueTracker;

const TARGET_RELEASE_FIELD: &str = "customfield_12311240";
const UPSTREAM_ISSUE_FIELD: &str = "customfield_12314640";
const GSS_PRIORITY_FIELD: &str = "customfield_12312340";
const HELP_DESK_TICKET_FIELD: &str = "customfield_12310120";
const SUPPORT_CASE_FIELD: &str = "customfield_12310021";
const SECURITY_SENSITIVE_FIELD: &str = "customfield_12311640";

const SECURITY_TRACKING_PREFIX: &str = "Security Tracking Issue";

/// Connection settings for one Jira project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// REST base, e.g. `https://issues.redhat.com/rest/api/2`
    pub server_url: String,
    pub project_key: String,
    /// Full `Authorization` header value (`Bearer ...`), if any
    pub auth: Option<String>,
    /// Parse downstream custom fields
    pub custom_fields: bool,
    /// Pattern for upstream keys inside the upstream-link field
    pub upstream_issue_pattern: String,
}

impl JiraConfig {
    pub fn new(server_url: &str, project_key: &str) -> Self {
        JiraConfig {
            server_url: server_url.trim_end_matches('/').to_string(),
            project_key: project_key.to_string(),
            auth: None,
            custom_fields: false,
            upstream_issue_pattern: "ARTEMIS-[0-9]+".to_string(),
        }
    }

    /// Set a bearer token
    pub fn with_token(mut self, token: &str) -> Self {
        self.auth = Some(format!("Bearer {}", token));
        self
    }

    /// Enable downstream custom-field parsing
    pub fn with_custom_fields(mut self, upstream_issue_pattern: &str) -> Self {
        self.custom_fields = true;
        self.upstream_issue_pattern = upstream_issue_pattern.to_string();
        self
    }
}

/// Jira client for one project.
#[derive(Clone)]
pub struct JiraClient {
    config: JiraConfig,
    http_client: reqwest::Client,
    upstream_issue_pattern: Regex,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> TrackerResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("backport-triage/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let upstream_issue_pattern =
            Regex::new(&config.upstream_issue_pattern).map_err(|e| TrackerError::UnknownValue {
                kind: "upstream issue pattern",
                value: e.to_string(),
            })?;

        Ok(JiraClient {
            config,
            http_client,
            upstream_issue_pattern,
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> TrackerResult<Value> {
        let url = format!("{}{}", self.config.server_url, path);
        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .header("Accept", "application/json")
            .query(query);
        if let Some(auth) = &self.config.auth {
            request = request.header("Authorization", auth.as_str());
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(method = %method, path, status = status.as_u16(), "tracker request failed");
            return Err(TrackerError::Status {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(method = %method, path, status = status.as_u16(), "tracker request");
        if text.trim().is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }

    async fn load_issue_json(&self, key: &str) -> TrackerResult<Option<Value>> {
        match self
            .call(Method::GET, &format!("/issue/{}", key), &[], None)
            .await
        {
            Ok(value) => Ok(Some(value)),
            Err(TrackerError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn issue_state(&self, key: &str) -> TrackerResult<IssueState> {
        let value = self
            .load_issue_json(key)
            .await?
            .ok_or_else(|| TrackerError::IssueNotFound(key.to_string()))?;
        let status = str_at(&value["fields"]["status"]["name"])
            .ok_or_else(|| invalid_field(key, "status"))?;
        IssueState::from_name(status)
    }

    /// Available transitions as `(id, target state)`.
    async fn transitions(&self, key: &str) -> TrackerResult<Vec<(String, IssueState)>> {
        let value = self
            .call(
                Method::GET,
                &format!("/issue/{}/transitions", key),
                &[("expand", "transitions.fields".to_string())],
                None,
            )
            .await?;

        let mut transitions = Vec::new();
        for transition in value["transitions"].as_array().into_iter().flatten() {
            let id = match &transition["id"] {
                Value::String(id) => id.clone(),
                Value::Number(id) => id.to_string(),
                _ => return Err(invalid_field(key, "transitions.id")),
            };
            let to = str_at(&transition["to"]["name"])
                .ok_or_else(|| invalid_field(key, "transitions.to"))?;
            // Workflows may expose statuses this tool never targets.
            if let Ok(state) = IssueState::from_name(to) {
                transitions.push((id, state));
            }
        }
        Ok(transitions)
    }

    fn jql(&self) -> String {
        format!("project=\"{}\"", self.config.project_key)
    }

    async fn count_issues(&self) -> TrackerResult<usize> {
        let value = self
            .call(
                Method::GET,
                "/search",
                &[("jql", self.jql()), ("maxResults", "0".to_string())],
                None,
            )
            .await?;
        value["total"]
            .as_u64()
            .map(|total| total as usize)
            .ok_or_else(|| invalid_field(&self.config.project_key, "total"))
    }

    async fn search_page(&self, start: usize, max_results: usize) -> TrackerResult<Vec<Issue>> {
        let value = self
            .call(
                Method::GET,
                "/search",
                &[
                    ("jql", self.jql()),
                    ("fields", "*all".to_string()),
                    ("maxResults", max_results.to_string()),
                    ("startAt", start.to_string()),
                ],
                None,
            )
            .await?;

        value["issues"]
            .as_array()
            .into_iter()
            .flatten()
            .map(|issue| self.parse(issue))
            .collect()
    }

    fn parse(&self, value: &Value) -> TrackerResult<Issue> {
        parse_issue(
            value,
            self.config.custom_fields,
            &self.upstream_issue_pattern,
        )
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    fn project_key(&self) -> &str {
        &self.config.project_key
    }

    async fn get_issue(&self, key: &str) -> TrackerResult<Option<Issue>> {
        match self.load_issue_json(key).await? {
            Some(value) => Ok(Some(self.parse(&value)?)),
            None => Ok(None),
        }
    }

    async fn create_issue(&self, new_issue: &NewIssue) -> TrackerResult<Issue> {
        let mut fields = json!({
            "project": { "key": self.config.project_key },
            "issuetype": { "name": new_issue.issue_type.to_name() },
            "summary": new_issue.summary,
            UPSTREAM_ISSUE_FIELD: new_issue.upstream_issue,
            TARGET_RELEASE_FIELD: { "name": new_issue.target_release },
            "labels": new_issue.labels,
        });
        if let Some(description) = &new_issue.description {
            fields["description"] = json!(description);
        }
        if let Some(assignee) = &new_issue.assignee {
            fields["assignee"] = json!({ "name": assignee });
        }

        let created = self
            .call(Method::POST, "/issue/", &[], Some(json!({ "fields": fields })))
            .await?;
        let key = str_at(&created["key"])
            .ok_or_else(|| invalid_field(&self.config.project_key, "key"))?
            .to_string();
        info!(key = %key, summary = %new_issue.summary, "issue created");

        self.get_issue(&key)
            .await?
            .ok_or(TrackerError::IssueNotFound(key))
    }

    async fn link_issue(&self, key: &str, linked_key: &str, link_type: &str) -> TrackerResult<()> {
        let link = json!({
            "type": { "name": link_type },
            "inwardIssue": { "key": key },
            "outwardIssue": { "key": linked_key },
        });
        self.call(Method::POST, "/issueLink", &[], Some(link))
            .await?;
        Ok(())
    }

    async fn add_labels(&self, key: &str, labels: &[String]) -> TrackerResult<()> {
        let value = self
            .load_issue_json(key)
            .await?
            .ok_or_else(|| TrackerError::IssueNotFound(key.to_string()))?;
        let mut merged: Vec<String> = value["fields"]["labels"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|l| l.as_str().map(str::to_string))
            .collect();
        let before = merged.len();
        for label in labels {
            if !merged.contains(label) {
                merged.push(label.clone());
            }
        }
        if merged.len() == before {
            return Ok(());
        }

        self.call(
            Method::PUT,
            &format!("/issue/{}", key),
            &[],
            Some(json!({ "fields": { "labels": merged } })),
        )
        .await?;
        Ok(())
    }

    async fn set_target_release(&self, key: &str, target_release: &str) -> TrackerResult<()> {
        self.call(
            Method::PUT,
            &format!("/issue/{}", key),
            &[],
            Some(json!({ "fields": { TARGET_RELEASE_FIELD: { "name": target_release } } })),
        )
        .await?;
        Ok(())
    }

    async fn transition_issue(&self, key: &str, state: IssueState) -> TrackerResult<()> {
        let mut current = self.issue_state(key).await?;

        while current != state {
            let unavailable = || TrackerError::TransitionUnavailable {
                key: key.to_string(),
                from: current.to_string(),
                to: state.to_string(),
            };
            let next = current.next_forward().ok_or_else(unavailable)?;
            let (id, _) = self
                .transitions(key)
                .await?
                .into_iter()
                .find(|(_, to)| *to == next)
                .ok_or_else(unavailable)?;

            self.call(
                Method::POST,
                &format!("/issue/{}/transitions", key),
                &[],
                Some(json!({ "transition": { "id": id } })),
            )
            .await?;
            debug!(key, from = %current, to = %next, "issue transitioned");
            current = next;
        }
        Ok(())
    }

    async fn load_project_issues(&self) -> TrackerResult<Vec<Issue>> {
        let total = self.count_issues().await?;
        let client = self.clone();
        load_pages(total, DEFAULT_PAGE_SIZE, default_workers(), move |start| {
            let client = client.clone();
            async move { client.search_page(start, DEFAULT_PAGE_SIZE).await }
        })
        .await
    }
}

fn str_at(value: &Value) -> Option<&str> {
    value.as_str()
}

fn present(value: &Value) -> bool {
    !value.is_null()
}

fn invalid_field(key: &str, field: &str) -> TrackerError {
    TrackerError::InvalidField {
        key: key.to_string(),
        field: field.to_string(),
    }
}

/// Build an [`Issue`] from a REST issue payload.
pub fn parse_issue(
    value: &Value,
    custom_fields: bool,
    upstream_issue_pattern: &Regex,
) -> TrackerResult<Issue> {
    let key = str_at(&value["key"])
        .ok_or_else(|| invalid_field("?", "key"))?
        .to_string();
    let fields = &value["fields"];

    let summary = str_at(&fields["summary"]).ok_or_else(|| invalid_field(&key, "summary"))?;
    let issue_type = IssueType::from_name(
        str_at(&fields["issuetype"]["name"]).ok_or_else(|| invalid_field(&key, "issuetype"))?,
    )?;
    let state = IssueState::from_name(
        str_at(&fields["status"]["name"]).ok_or_else(|| invalid_field(&key, "status"))?,
    )?;

    let mut issue = Issue::new(&key, issue_type, summary);
    issue.state = state;
    issue.assignee = str_at(&fields["assignee"]["name"]).map(str::to_string);
    issue.creator = str_at(&fields["creator"]["name"]).map(str::to_string);
    issue.reporter = str_at(&fields["reporter"]["name"]).map(str::to_string);
    issue.description = str_at(&fields["description"]).map(str::to_string);
    issue.labels = fields["labels"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|l| l.as_str().map(str::to_string))
        .collect();

    if !custom_fields {
        return Ok(issue);
    }

    if let Some(upstream) = str_at(&fields[UPSTREAM_ISSUE_FIELD]) {
        issue.issues = upstream_issue_pattern
            .find_iter(upstream)
            .map(|m| m.as_str().to_string())
            .collect();
    }

    issue.target_release = str_at(&fields[TARGET_RELEASE_FIELD]["name"]).map(str::to_string);

    let links = &fields["issuelinks"];
    issue.patch = present(links) && patch_pattern().is_match(&links.to_string());

    let gss_priority = &fields[GSS_PRIORITY_FIELD];
    issue.customer = issue.patch
        || present(gss_priority)
        || present(&fields[HELP_DESK_TICKET_FIELD])
        || present(&fields[SUPPORT_CASE_FIELD]);
    issue.customer_priority = match str_at(&gss_priority["value"]) {
        Some(priority) => priority.parse()?,
        None => CustomerPriority::None,
    };

    issue.security = present(&fields[SECURITY_SENSITIVE_FIELD]);
    issue.security_impact = match issue.description.as_deref() {
        Some(description) if description.starts_with(SECURITY_TRACKING_PREFIX) => {
            security_impact(description)?
        }
        _ => SecurityImpact::None,
    };

    Ok(issue)
}

fn patch_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("PATCH-[0-9]+").expect("valid patch pattern"))
}

fn security_impact(description: &str) -> TrackerResult<SecurityImpact> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new("Impact: (Critical|Important|Moderate|Low)").expect("valid impact pattern")
    });
    match pattern.captures(description).and_then(|c| c.get(1)) {
        Some(impact) => impact.as_str().parse(),
        None => Ok(SecurityImpact::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream_pattern() -> Regex {
        Regex::new("ARTEMIS-[0-9]+").unwrap()
    }

    fn downstream_payload() -> Value {
        json!({
            "key": "ENTMQBR-7",
            "fields": {
                "summary": "Broker leaks sessions",
                "issuetype": { "name": "Bug" },
                "status": { "name": "Ready for Review" },
                "assignee": { "name": "jdoe" },
                "creator": { "name": "creator1" },
                "reporter": { "name": "reporter1" },
                "description": "Security Tracking Issue\nImpact: Important\nMore text",
                "labels": ["CR1", null, "upstream-test-coverage"],
                "customfield_12314640": "https://issues.apache.org/jira/browse/ARTEMIS-123",
                "customfield_12311240": { "name": "AMQ 7.11.0.GA" },
                "issuelinks": [ { "outwardIssue": { "key": "PATCH-44" } } ],
                "customfield_12312340": { "value": "High" },
                "customfield_12311640": [ { "value": "yes" } ]
            }
        })
    }

    #[test]
    fn test_parse_downstream_issue_with_custom_fields() {
        let issue = parse_issue(&downstream_payload(), true, &upstream_pattern()).unwrap();

        assert_eq!(issue.key, "ENTMQBR-7");
        assert_eq!(issue.state, IssueState::ReadyForReview);
        assert_eq!(issue.assignee.as_deref(), Some("jdoe"));
        assert_eq!(issue.labels, vec!["CR1", "upstream-test-coverage"]);
        assert_eq!(issue.issues, vec!["ARTEMIS-123"]);
        assert_eq!(issue.target_release.as_deref(), Some("AMQ 7.11.0.GA"));
        assert!(issue.patch);
        assert!(issue.customer);
        assert_eq!(issue.customer_priority, CustomerPriority::High);
        assert!(issue.security);
        assert_eq!(issue.security_impact, SecurityImpact::Important);
    }

    #[test]
    fn test_parse_without_custom_fields_ignores_them() {
        let issue = parse_issue(&downstream_payload(), false, &upstream_pattern()).unwrap();

        assert!(issue.issues.is_empty());
        assert!(issue.target_release.is_none());
        assert!(!issue.customer);
        assert_eq!(issue.security_impact, SecurityImpact::None);
    }

    #[test]
    fn test_parse_unassigned_issue_without_links() {
        let payload = json!({
            "key": "ARTEMIS-9",
            "fields": {
                "summary": "Add metric",
                "issuetype": { "name": "New Feature" },
                "status": { "name": "Open" },
                "assignee": null,
                "creator": { "name": "c" },
                "reporter": { "name": "r" },
                "description": null,
                "labels": [],
                "customfield_12314640": null,
                "issuelinks": []
            }
        });
        let issue = parse_issue(&payload, true, &upstream_pattern()).unwrap();

        assert_eq!(issue.issue_type, IssueType::NewFeature);
        assert_eq!(issue.state, IssueState::New);
        assert!(issue.assignee.is_none());
        assert!(!issue.patch);
        assert!(!issue.customer);
        assert_eq!(issue.customer_priority, CustomerPriority::None);
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let mut payload = downstream_payload();
        payload["fields"]["status"]["name"] = json!("Verified");
        let err = parse_issue(&payload, true, &upstream_pattern()).unwrap_err();
        assert!(matches!(err, TrackerError::UnknownValue { .. }));
    }

    #[test]
    fn test_config_builders() {
        let config = JiraConfig::new("https://issues.example.com/rest/api/2/", "ENTMQBR")
            .with_token("t0k")
            .with_custom_fields("ARTEMIS-[0-9]+");
        assert_eq!(config.server_url, "https://issues.example.com/rest/api/2");
        assert_eq!(config.auth.as_deref(), Some("Bearer t0k"));
        assert!(config.custom_fields);
        assert!(JiraClient::new(config).is_ok());
    }
}

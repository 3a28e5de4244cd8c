//! Jira REST 数据结构

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// 一条工单：key + 按字段 ID 索引的原始字段值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub key: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Ticket {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn with_summary(self, summary: &str) -> Self {
        self.with_field("summary", json!(summary))
    }

    pub fn with_parent(self, key: &str) -> Self {
        self.with_field("parent", json!({ "key": key }))
    }

    pub fn with_subtasks(self, keys: &[&str]) -> Self {
        let subtasks: Vec<Value> = keys.iter().map(|k| json!({ "key": k })).collect();
        self.with_field("subtasks", Value::Array(subtasks))
    }

    /// 追加一条 inward 方向的链接（`key` 指向的工单 "阻塞" 本工单）
    pub fn with_inward_link(mut self, label: &str, key: &str) -> Self {
        let link = json!({
            "type": { "name": "Blocks", "inward": label, "outward": "blocks" },
            "inwardIssue": { "key": key }
        });
        match self.fields.get_mut("issuelinks") {
            Some(Value::Array(links)) => links.push(link),
            _ => {
                self.fields
                    .insert("issuelinks".to_string(), Value::Array(vec![link]));
            }
        }
        self
    }

    /// 字段值，`null` 视为不存在
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn summary(&self) -> &str {
        self.field_str("summary").unwrap_or_default()
    }

    pub fn parent_key(&self) -> Option<&str> {
        self.field("parent")
            .and_then(|p| p.get("key"))
            .and_then(Value::as_str)
    }

    pub fn subtask_keys(&self) -> Vec<&str> {
        self.field("subtasks")
            .and_then(Value::as_array)
            .map(|subtasks| {
                subtasks
                    .iter()
                    .filter_map(|s| s.get("key").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 解析 `issuelinks`，格式不对的链接直接跳过
    pub fn links(&self) -> Vec<IssueLink> {
        self.field("issuelinks")
            .and_then(Value::as_array)
            .map(|links| {
                links
                    .iter()
                    .filter_map(|l| serde_json::from_value(l.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 有限的数值或数字字符串；其他类型以及 `NaN` / `inf` 返回 `None`
    pub fn number_field(&self, name: &str) -> Option<f64> {
        let value = match self.field(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }
}

/// 工单之间的链接
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLink {
    #[serde(rename = "type")]
    pub link_type: IssueLinkType,
    #[serde(rename = "inwardIssue", default)]
    pub inward_issue: Option<LinkedIssue>,
    #[serde(rename = "outwardIssue", default)]
    pub outward_issue: Option<LinkedIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLinkType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inward: String,
    #[serde(default)]
    pub outward: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedIssue {
    pub key: String,
}

/// `GET /rest/api/2/search` 的响应
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: usize,
    #[serde(default)]
    pub max_results: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub issues: Vec<Ticket>,
}

/// `GET /rest/api/2/field` 的单个字段描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraField {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub custom: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_search_issue() {
        let body = json!({
            "startAt": 0,
            "maxResults": 50,
            "total": 1,
            "issues": [{
                "key": "PRJ-1",
                "fields": {
                    "summary": "Design",
                    "customfield_1": "2024-01-01",
                    "customfield_2": null,
                    "parent": { "key": "PRJ-0" },
                    "subtasks": [{ "key": "PRJ-2" }, { "key": "PRJ-3" }],
                    "issuelinks": [
                        {
                            "type": { "name": "Blocks", "inward": "is blocked by", "outward": "blocks" },
                            "inwardIssue": { "key": "PRJ-9" }
                        },
                        {
                            "type": { "name": "Blocks", "inward": "is blocked by", "outward": "blocks" },
                            "outwardIssue": { "key": "PRJ-8" }
                        },
                        { "broken": true }
                    ]
                }
            }]
        });
        let page: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(page.total, 1);

        let ticket = &page.issues[0];
        assert_eq!(ticket.summary(), "Design");
        assert_eq!(ticket.field_str("customfield_1"), Some("2024-01-01"));
        assert_eq!(ticket.field("customfield_2"), None);
        assert_eq!(ticket.parent_key(), Some("PRJ-0"));
        assert_eq!(ticket.subtask_keys(), vec!["PRJ-2", "PRJ-3"]);

        let links = ticket.links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].inward_issue.as_ref().unwrap().key, "PRJ-9");
        assert!(links[1].inward_issue.is_none());
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let ticket = Ticket::new("PRJ-1");
        assert_eq!(ticket.summary(), "");
        assert_eq!(ticket.parent_key(), None);
        assert!(ticket.subtask_keys().is_empty());
        assert!(ticket.links().is_empty());
    }

    #[test]
    fn test_number_field() {
        let ticket = Ticket::new("PRJ-1")
            .with_field("a", json!(42.5))
            .with_field("b", json!("75"))
            .with_field("c", json!({ "value": 3 }));
        assert_eq!(ticket.number_field("a"), Some(42.5));
        assert_eq!(ticket.number_field("b"), Some(75.0));
        assert_eq!(ticket.number_field("c"), None);
        assert_eq!(ticket.number_field("missing"), None);
    }

    #[test]
    fn test_number_field_rejects_non_finite() {
        let ticket = Ticket::new("PRJ-1")
            .with_field("a", json!("NaN"))
            .with_field("b", json!("inf"))
            .with_field("c", json!("-infinity"));
        assert_eq!(ticket.number_field("a"), None);
        assert_eq!(ticket.number_field("b"), None);
        assert_eq!(ticket.number_field("c"), None);
    }

    #[test]
    fn test_with_inward_link_appends() {
        let ticket = Ticket::new("PRJ-1")
            .with_inward_link("is blocked by", "PRJ-2")
            .with_inward_link("relates to", "PRJ-3");
        let links = ticket.links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].link_type.inward, "relates to");
    }
}

//! Normalized event records shown in the table.
//!
//! Payloads are decoded once, into [`EventPayload`], when a raw event is
//! normalized. Tags outside the known set fall back to [`EventPayload::Other`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::source::RawEvent;

/// Event type tags accepted by `--filter`.
pub const KNOWN_EVENT_TYPES: &[&str] = &[
    "CommitCommentEvent",
    "CreateEvent",
    "DeleteEvent",
    "ForkEvent",
    "GollumEvent",
    "IssueCommentEvent",
    "IssuesEvent",
    "MemberEvent",
    "PublicEvent",
    "PullRequestEvent",
    "PullRequestReviewEvent",
    "PullRequestReviewCommentEvent",
    "PullRequestReviewThreadEvent",
    "PushEvent",
    "ReleaseEvent",
    "SponsorshipEvent",
    "WatchEvent",
];

pub fn is_known_event_type(tag: &str) -> bool {
    KNOWN_EVENT_TYPES.contains(&tag)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub login: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub name: String,
    pub url: String,
}

/// A single row of activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub created_at: DateTime<Utc>,
    /// `created_at` rendered relative to fetch time, e.g. "3 hours ago".
    pub date: String,
    pub kind: String,
    pub actor: Actor,
    pub repo: Repo,
    pub description: String,
}

impl Event {
    /// Normalize a raw API event relative to `now`.
    pub fn from_raw(raw: RawEvent, now: DateTime<Utc>) -> Self {
        let payload = EventPayload::decode(&raw.kind, raw.payload);
        let description = payload.describe(&raw.kind, &raw.repo.name);
        Self {
            date: relative_time(now, raw.created_at),
            created_at: raw.created_at,
            kind: raw.kind,
            actor: Actor {
                login: raw.actor.login,
                avatar_url: raw.actor.avatar_url,
            },
            repo: Repo {
                name: raw.repo.name,
                url: raw.repo.url,
            },
            description,
        }
    }

    /// Browser URL of the event's repository.
    pub fn repo_html_url(&self) -> Option<String> {
        repo_html_url(&self.repo.name)
    }
}

/// `https://github.com/<owner>/<name>`, or `None` for a malformed name.
pub fn repo_html_url(repo_name: &str) -> Option<String> {
    let mut parts = repo_name.split('/');
    let (owner, name) = (parts.next()?, parts.next()?);
    let valid = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if parts.next().is_some() || !valid(owner) || !valid(name) {
        return None;
    }
    Some(format!("https://github.com/{}/{}", owner, name))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub body: String,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PullRequestRef {
    pub number: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Member {
    pub login: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Release {
    pub name: Option<String>,
    pub tag_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommitCommentPayload {
    pub comment: Comment,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RefPayload {
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub ref_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IssueCommentPayload {
    pub issue: Issue,
    pub comment: Comment,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IssuesPayload {
    pub action: String,
    pub issue: Issue,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemberPayload {
    pub action: String,
    pub member: Member,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PullRequestPayload {
    pub action: String,
    pub number: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReviewPayload {
    pub pull_request: PullRequestRef,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReleasePayload {
    pub release: Release,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SponsorshipPayload {
    pub action: String,
}

/// Type-specific payload, keyed by the event's type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    CommitComment(CommitCommentPayload),
    Create(RefPayload),
    Delete(RefPayload),
    Fork,
    Gollum,
    IssueComment(IssueCommentPayload),
    Issues(IssuesPayload),
    Member(MemberPayload),
    Public,
    PullRequest(PullRequestPayload),
    PullRequestReview(ReviewPayload),
    PullRequestReviewComment(ReviewPayload),
    PullRequestReviewThread(ReviewPayload),
    Push(PushPayload),
    Release(ReleasePayload),
    Sponsorship(SponsorshipPayload),
    Watch,
    /// A known tag whose payload did not have the expected shape.
    Malformed,
    /// A tag this tool does not know about.
    Other,
}

impl EventPayload {
    pub fn decode(tag: &str, payload: serde_json::Value) -> Self {
        fn typed<T: DeserializeOwned>(
            payload: serde_json::Value,
            wrap: fn(T) -> EventPayload,
        ) -> EventPayload {
            serde_json::from_value(payload)
                .map(wrap)
                .unwrap_or(EventPayload::Malformed)
        }

        match tag {
            "CommitCommentEvent" => typed(payload, EventPayload::CommitComment),
            "CreateEvent" => typed(payload, EventPayload::Create),
            "DeleteEvent" => typed(payload, EventPayload::Delete),
            "ForkEvent" => EventPayload::Fork,
            "GollumEvent" => EventPayload::Gollum,
            "IssueCommentEvent" => typed(payload, EventPayload::IssueComment),
            "IssuesEvent" => typed(payload, EventPayload::Issues),
            "MemberEvent" => typed(payload, EventPayload::Member),
            "PublicEvent" => EventPayload::Public,
            "PullRequestEvent" => typed(payload, EventPayload::PullRequest),
            "PullRequestReviewEvent" => typed(payload, EventPayload::PullRequestReview),
            "PullRequestReviewCommentEvent" => {
                typed(payload, EventPayload::PullRequestReviewComment)
            }
            "PullRequestReviewThreadEvent" => typed(payload, EventPayload::PullRequestReviewThread),
            "PushEvent" => typed(payload, EventPayload::Push),
            "ReleaseEvent" => typed(payload, EventPayload::Release),
            "SponsorshipEvent" => typed(payload, EventPayload::Sponsorship),
            "WatchEvent" => EventPayload::Watch,
            _ => EventPayload::Other,
        }
    }

    /// One-line, human-readable summary.
    pub fn describe(&self, tag: &str, repo_name: &str) -> String {
        match self {
            EventPayload::CommitComment(p) => match p.comment.position {
                Some(position) => format!(
                    "Commit comment on #{}: {}",
                    position,
                    first_line(&p.comment.body)
                ),
                None => format!("Commit comment: {}", first_line(&p.comment.body)),
            },
            EventPayload::Create(p) => match &p.git_ref {
                Some(git_ref) => format!("Created {} ({})", p.ref_type, git_ref),
                None => format!("Created {}", p.ref_type),
            },
            EventPayload::Delete(p) => {
                format!("Deleted {} ({})", p.ref_type, p.git_ref.as_deref().unwrap_or(""))
            }
            EventPayload::Fork => "Forked repository".to_string(),
            EventPayload::Gollum => "Wiki page event".to_string(),
            EventPayload::IssueComment(p) => format!(
                "Issue comment on #{}: {:?}",
                p.issue.number,
                first_line(&p.comment.body)
            ),
            EventPayload::Issues(p) => {
                format!("Issue #{} {}: {}", p.issue.number, p.action, p.issue.title)
            }
            EventPayload::Member(p) => format!("Member {} {}", p.member.login, p.action),
            EventPayload::Public => format!("Repository {} made public", repo_name),
            EventPayload::PullRequest(p) => format!("PR #{} {}", p.number, p.action),
            EventPayload::PullRequestReview(p) => {
                format!("PR review on #{}", p.pull_request.number)
            }
            EventPayload::PullRequestReviewComment(p) => {
                format!("PR review comment on #{}", p.pull_request.number)
            }
            EventPayload::PullRequestReviewThread(p) => {
                format!("PR review thread on #{}", p.pull_request.number)
            }
            EventPayload::Push(p) => {
                let branch = p.git_ref.trim_start_matches("refs/heads/");
                match p.commits.first() {
                    Some(commit) => format!(
                        "Pushed {} commit(s) to {}: {:?}",
                        p.commits.len(),
                        branch,
                        first_line(&commit.message)
                    ),
                    None => format!("Pushed to {}", branch),
                }
            }
            EventPayload::Release(p) => {
                let name = p
                    .release
                    .name
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(&p.release.tag_name);
                format!("Released {}", name)
            }
            EventPayload::Sponsorship(p) => format!("Sponsorship {}", p.action),
            EventPayload::Watch => "Starred repository".to_string(),
            EventPayload::Malformed => String::new(),
            EventPayload::Other => tag.trim_end_matches("Event").to_string(),
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

/// Render `then` relative to `now`: "now", "5 minutes ago", "3 weeks ago".
pub fn relative_time(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const WEEK: i64 = 7 * DAY;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 12 * MONTH;
    const LONG_TIME: i64 = 37 * YEAR;

    let diff = (now - then).num_seconds();
    let (delta, suffix) = if diff >= 0 {
        (diff, "ago")
    } else {
        (-diff, "from now")
    };

    let phrase = |n: i64, unit: &str| {
        if n == 1 {
            let article = if unit == "hour" { "an" } else { "a" };
            format!("{} {} {}", article, unit, suffix)
        } else {
            format!("{} {}s {}", n, unit, suffix)
        }
    };

    match delta {
        0 => "now".to_string(),
        d if d < 2 => format!("1 second {}", suffix),
        d if d < MINUTE => format!("{} seconds {}", d, suffix),
        d if d < 2 * MINUTE => phrase(1, "minute"),
        d if d < HOUR => phrase(d / MINUTE, "minute"),
        d if d < 2 * HOUR => phrase(1, "hour"),
        d if d < DAY => phrase(d / HOUR, "hour"),
        d if d < 2 * DAY => phrase(1, "day"),
        d if d < WEEK => phrase(d / DAY, "day"),
        d if d < 2 * WEEK => phrase(1, "week"),
        d if d < MONTH => phrase(d / WEEK, "week"),
        d if d < 2 * MONTH => phrase(1, "month"),
        d if d < YEAR => phrase(d / MONTH, "month"),
        d if d < 2 * YEAR => phrase(1, "year"),
        d if d < LONG_TIME => phrase(d / YEAR, "year"),
        _ => "a long while ago".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawActor, RawRepo};
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn raw(kind: &str, payload: serde_json::Value) -> RawEvent {
        RawEvent {
            id: "1".to_string(),
            kind: kind.to_string(),
            actor: RawActor {
                login: "octocat".to_string(),
                avatar_url: String::new(),
            },
            repo: RawRepo {
                name: "octocat/hello".to_string(),
                url: String::new(),
            },
            created_at: now() - Duration::hours(3),
            payload,
        }
    }

    #[test]
    fn test_relative_time_buckets() {
        let n = now();
        assert_eq!(relative_time(n, n), "now");
        assert_eq!(relative_time(n, n - Duration::seconds(1)), "1 second ago");
        assert_eq!(relative_time(n, n - Duration::seconds(30)), "30 seconds ago");
        assert_eq!(relative_time(n, n - Duration::seconds(90)), "a minute ago");
        assert_eq!(relative_time(n, n - Duration::minutes(5)), "5 minutes ago");
        assert_eq!(relative_time(n, n - Duration::minutes(61)), "an hour ago");
        assert_eq!(relative_time(n, n - Duration::hours(3)), "3 hours ago");
        assert_eq!(relative_time(n, n - Duration::hours(30)), "a day ago");
        assert_eq!(relative_time(n, n - Duration::days(4)), "4 days ago");
        assert_eq!(relative_time(n, n - Duration::days(8)), "a week ago");
        assert_eq!(relative_time(n, n - Duration::days(21)), "3 weeks ago");
        assert_eq!(relative_time(n, n - Duration::days(45)), "a month ago");
        assert_eq!(relative_time(n, n - Duration::days(400)), "a year ago");
        assert_eq!(relative_time(n, n - Duration::days(365 * 5)), "5 years ago");
        assert_eq!(relative_time(n, n - Duration::days(365 * 50)), "a long while ago");
        assert_eq!(relative_time(n, n + Duration::minutes(5)), "5 minutes from now");
    }

    #[test]
    fn test_push_description() {
        let event = Event::from_raw(
            raw(
                "PushEvent",
                json!({"ref": "refs/heads/main", "commits": [{"message": "Fix bug\n\nlong body"}, {"message": "b"}]}),
            ),
            now(),
        );
        assert_eq!(event.description, r#"Pushed 2 commit(s) to main: "Fix bug""#);
        assert_eq!(event.date, "3 hours ago");
        assert_eq!(event.kind, "PushEvent");
    }

    #[test]
    fn test_descriptions_for_known_tags() {
        let cases = [
            ("CreateEvent", json!({"ref": "v1.0", "ref_type": "tag"}), "Created tag (v1.0)"),
            ("CreateEvent", json!({"ref": null, "ref_type": "repository"}), "Created repository"),
            ("DeleteEvent", json!({"ref": "old", "ref_type": "branch"}), "Deleted branch (old)"),
            ("ForkEvent", json!({}), "Forked repository"),
            ("IssuesEvent", json!({"action": "opened", "issue": {"number": 7, "title": "Crash"}}), "Issue #7 opened: Crash"),
            ("PullRequestEvent", json!({"action": "closed", "number": 12}), "PR #12 closed"),
            ("PullRequestReviewEvent", json!({"pull_request": {"number": 3}}), "PR review on #3"),
            ("MemberEvent", json!({"action": "added", "member": {"login": "hubot"}}), "Member hubot added"),
            ("PublicEvent", json!({}), "Repository octocat/hello made public"),
            ("ReleaseEvent", json!({"release": {"name": "", "tag_name": "v2"}}), "Released v2"),
            ("WatchEvent", json!({"action": "started"}), "Starred repository"),
        ];
        for (kind, payload, expected) in cases {
            let event = Event::from_raw(raw(kind, payload), now());
            assert_eq!(event.description, expected, "{kind}");
        }
    }

    #[test]
    fn test_unknown_tag_degrades() {
        let event = Event::from_raw(raw("DiscussionEvent", json!({"x": 1})), now());
        assert_eq!(event.description, "Discussion");
        assert!(matches!(
            EventPayload::decode("DiscussionEvent", json!({})),
            EventPayload::Other
        ));
    }

    #[test]
    fn test_malformed_known_payload_is_empty() {
        let event = Event::from_raw(raw("IssuesEvent", json!({"issue": "not an object"})), now());
        assert_eq!(event.description, "");
    }

    #[test]
    fn test_repo_html_url() {
        assert_eq!(
            repo_html_url("octocat/hello-world").as_deref(),
            Some("https://github.com/octocat/hello-world")
        );
        assert_eq!(repo_html_url(""), None);
        assert_eq!(repo_html_url("noslash"), None);
        assert_eq!(repo_html_url("a/b/c"), None);
        assert_eq!(repo_html_url("a b/c"), None);
    }

    #[test]
    fn test_known_event_types() {
        assert!(is_known_event_type("PushEvent"));
        assert!(!is_known_event_type("PushEvents"));
    }
}

//! Ordered URL-pattern registry that picks a resource kind for a `self` link.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::kind::ResourceKind;

/// Builtin rules, in evaluation order. Several patterns can match the same
/// URL; the first declared wins, so this order must not change.
const BUILTIN_RULES: &[(&str, ResourceKind)] = &[
    // Jira
    (r"attachment/[^/]+$", ResourceKind::Attachment),
    (r"component/[^/]+$", ResourceKind::Component),
    (r"customFieldOption/[^/]+$", ResourceKind::CustomFieldOption),
    (r"dashboard/[^/]+$", ResourceKind::Dashboard),
    (r"filter/[^/]+$", ResourceKind::Filter),
    (r"issue/[^/]+$", ResourceKind::Issue),
    (r"issue/[^/]+/comment/[^/]+$", ResourceKind::Comment),
    (r"issue/[^/]+/votes$", ResourceKind::Votes),
    (r"issue/[^/]+/watchers$", ResourceKind::Watchers),
    (r"issue/[^/]+/worklog/[^/]+$", ResourceKind::Worklog),
    (r"issue/[^/]+/remotelink/[^/]+$", ResourceKind::RemoteLink),
    (r"issueLink/[^/]+$", ResourceKind::IssueLink),
    (r"issueLinkType/[^/]+$", ResourceKind::IssueLinkType),
    (r"issuetype/[^/]+$", ResourceKind::IssueType),
    (r"priority/[^/]+$", ResourceKind::Priority),
    (r"project/[^/]+$", ResourceKind::Project),
    (r"project/[^/]+/role/[^/]+$", ResourceKind::Role),
    (r"resolution/[^/]+$", ResourceKind::Resolution),
    (r"securitylevel/[^/]+$", ResourceKind::SecurityLevel),
    (r"status/[^/]+$", ResourceKind::Status),
    (r"user\?username.+$", ResourceKind::User),
    (r"version/[^/]+$", ResourceKind::Version),
    // GreenHopper
    (r"sprints/[^/]+$", ResourceKind::Sprint),
    (r"views/[^/]+$", ResourceKind::Board),
];

static BUILTIN: LazyLock<Registry> = LazyLock::new(|| {
    Registry::new(BUILTIN_RULES).unwrap_or_else(|e| panic!("invalid builtin pattern: {e}"))
});

/// An immutable, ordered list of `(pattern, kind)` rules.
///
/// Patterns are searched (not anchored at the start) in the path of the
/// candidate URL, with the query string appended when present.
#[derive(Debug, Clone)]
pub struct Registry {
    rules: Vec<(Regex, ResourceKind)>,
}

impl Registry {
    /// Compile a registry from rules in evaluation order.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn new(rules: &[(&str, ResourceKind)]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|(pattern, kind)| Regex::new(pattern).map(|re| (re, *kind)))
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }

    /// The process-wide registry of builtin kinds.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Kind for a `self` URL: the first matching rule, or
    /// [`ResourceKind::Generic`].
    pub fn resolve(&self, self_url: &str) -> ResourceKind {
        let target = match_target(self_url);
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(&target))
            .map(|(_, kind)| *kind)
            .unwrap_or(ResourceKind::Generic)
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, ResourceKind)> {
        self.rules.iter().map(|(re, kind)| (re.as_str(), *kind))
    }
}

fn match_target(self_url: &str) -> String {
    match Url::parse(self_url) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => self_url.to_string(),
    }
}

//! Resource kinds, their path templates, and id binding.

use std::fmt;

/// Which REST root a kind lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoot {
    /// `{server}/rest/{rest_path}/{rest_api_version}/`
    Core,
    /// `{server}/rest/greenhopper/1.0/`
    GreenHopper,
}

/// Every concrete resource kind the API exposes.
///
/// The kind decides the path template and any CRUD override; see
/// [`crate::resource::UpdateRequest`] and [`crate::resource::DeleteRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// No specialized behavior. The path template is supplied by the caller.
    Generic,
    Attachment,
    Component,
    CustomFieldOption,
    Dashboard,
    Filter,
    Issue,
    Comment,
    Votes,
    Watchers,
    Worklog,
    RemoteLink,
    IssueLink,
    IssueLinkType,
    IssueType,
    Priority,
    Project,
    Role,
    Resolution,
    SecurityLevel,
    Status,
    User,
    Version,
    Sprint,
    Board,
}

impl ResourceKind {
    /// Type name used in labels and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generic => "Resource",
            Self::Attachment => "Attachment",
            Self::Component => "Component",
            Self::CustomFieldOption => "CustomFieldOption",
            Self::Dashboard => "Dashboard",
            Self::Filter => "Filter",
            Self::Issue => "Issue",
            Self::Comment => "Comment",
            Self::Votes => "Votes",
            Self::Watchers => "Watchers",
            Self::Worklog => "Worklog",
            Self::RemoteLink => "RemoteLink",
            Self::IssueLink => "IssueLink",
            Self::IssueLinkType => "IssueLinkType",
            Self::IssueType => "IssueType",
            Self::Priority => "Priority",
            Self::Project => "Project",
            Self::Role => "Role",
            Self::Resolution => "Resolution",
            Self::SecurityLevel => "SecurityLevel",
            Self::Status => "Status",
            Self::User => "User",
            Self::Version => "Version",
            Self::Sprint => "Sprint",
            Self::Board => "Board",
        }
    }

    /// Path template relative to the kind's API root.
    ///
    /// Positional placeholders (`{0}`, `{1}`) are bound from the id passed to
    /// `find`; named placeholders (`{id}`) from the resource's own payload.
    /// [`ResourceKind::Generic`] has no template of its own.
    pub const fn path_template(self) -> Option<&'static str> {
        Some(match self {
            Self::Generic => return None,
            Self::Attachment => "attachment/{0}",
            Self::Component => "component/{0}",
            Self::CustomFieldOption => "customFieldOption/{0}",
            Self::Dashboard => "dashboard/{0}",
            Self::Filter => "filter/{0}",
            Self::Issue => "issue/{0}",
            Self::Comment => "issue/{0}/comment/{1}",
            Self::Votes => "issue/{0}/votes",
            Self::Watchers => "issue/{0}/watchers",
            Self::Worklog => "issue/{0}/worklog/{1}",
            Self::RemoteLink => "issue/{0}/remotelink/{1}",
            Self::IssueLink => "issueLink/{0}",
            Self::IssueLinkType => "issueLinkType/{0}",
            Self::IssueType => "issuetype/{0}",
            Self::Priority => "priority/{0}",
            Self::Project => "project/{0}",
            Self::Role => "project/{0}/role/{1}",
            Self::Resolution => "resolution/{0}",
            Self::SecurityLevel => "securitylevel/{0}",
            Self::Status => "status/{0}",
            Self::User => "user?username={0}",
            Self::Version => "version/{0}",
            Self::Sprint => "sprint/{id}",
            Self::Board => "rapidview/{id}",
        })
    }

    pub const fn api_root(self) -> ApiRoot {
        match self {
            Self::Sprint | Self::Board => ApiRoot::GreenHopper,
            _ => ApiRoot::Core,
        }
    }

    /// All kinds except [`ResourceKind::Generic`].
    pub const ALL: [ResourceKind; 24] = [
        Self::Attachment,
        Self::Component,
        Self::CustomFieldOption,
        Self::Dashboard,
        Self::Filter,
        Self::Issue,
        Self::Comment,
        Self::Votes,
        Self::Watchers,
        Self::Worklog,
        Self::RemoteLink,
        Self::IssueLink,
        Self::IssueLinkType,
        Self::IssueType,
        Self::Priority,
        Self::Project,
        Self::Role,
        Self::Resolution,
        Self::SecurityLevel,
        Self::Status,
        Self::User,
        Self::Version,
        Self::Sprint,
        Self::Board,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier passed to `find`: a single value or an ordered tuple bound to
/// successive positional placeholders.
///
/// ```
/// use jira_resources::ResourceId;
///
/// let single = ResourceId::from("PROJ-1");
/// let comment = ResourceId::from(("PROJ-1", 10200));
/// assert_eq!(comment.parts(), ["PROJ-1", "10200"]);
/// assert_eq!(single.parts(), ["PROJ-1"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId(Vec<String>);

impl ResourceId {
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(vec![id.to_string()])
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(vec![id])
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self(vec![id.to_string()])
    }
}

impl From<Vec<String>> for ResourceId {
    fn from(ids: Vec<String>) -> Self {
        Self(ids)
    }
}

impl<A: ToString, B: ToString> From<(A, B)> for ResourceId {
    fn from((a, b): (A, B)) -> Self {
        Self(vec![a.to_string(), b.to_string()])
    }
}

/// Fill `{...}` placeholders in `template`.
///
/// `lookup` receives the placeholder name (`"0"`, `"id"`, ...) and returns the
/// value to insert. The first unresolved placeholder is returned as the error.
pub(crate) fn fill_template<F>(template: &str, mut lookup: F) -> Result<String, String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| format!("unclosed placeholder in '{template}'"))?;
        let name = &after[..end];
        let value = lookup(name).ok_or_else(|| format!("no value for placeholder {{{name}}}"))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Bind placeholders from `id`, percent-encoding each part.
///
/// `{N}` takes part `N`. Named placeholders (`{id}`) take the parts in order
/// of appearance.
pub(crate) fn bind_positional(template: &str, id: &ResourceId) -> Result<String, String> {
    let mut next_named = 0;
    fill_template(template, |name| {
        let index = match name.parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                next_named += 1;
                next_named - 1
            }
        };
        id.parts()
            .get(index)
            .map(|part| urlencoding::encode(part).into_owned())
    })
}

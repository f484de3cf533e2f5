mod de;
mod filter;
mod issue;
mod search;
mod user;
mod worklog;

pub use filter::Filter;
pub use issue::{Issue, IssueFields, NamedRef, ParentFields, ParentRef};
pub use search::SearchPage;
pub use user::JiraUser;
pub use worklog::{Worklog, WorklogPage};

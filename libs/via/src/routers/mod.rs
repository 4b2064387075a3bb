//! Stock route descriptors.
//!
//! * [`Basic`] binds one axum handler to a path.
//! * [`Include`] pulls in the routes of another routes module.
//! * [`Blueprint`] registers another module's routes as a named, prefixed group.

mod basic;
mod blueprint;
mod include;

pub use basic::Basic;
pub use blueprint::Blueprint;
pub use include::Include;

/// Concatenate a URL prefix and a path, collapsing the slash between them.
pub fn join_url(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    match path {
        "" if prefix.is_empty() => "/".to_string(),
        "" => prefix.to_string(),
        p if p.starts_with('/') => format!("{prefix}{p}"),
        p => format!("{prefix}/{p}"),
    }
}

/// `parent.own`, or just `own` at the top level.
pub fn join_endpoint(parent: Option<&str>, own: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}.{own}"),
        None => own.to_string(),
    }
}

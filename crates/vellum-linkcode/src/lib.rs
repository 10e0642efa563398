//! Link-to-source for API descriptions.
//!
//! Documented Python objects are located in the package sources and linked
//! to their lines on GitHub. The same resolution gives API pages an "edit
//! this page" link to the module they document.

mod edit;
mod locator;
mod resolver;
mod transform;

use std::collections::BTreeMap;

use vellum_doctree::DescSignature;

pub use edit::EditLinkResolver;
pub use locator::{PythonSourceLocator, SourceLocator, SourceSpan};
pub use resolver::{DEFAULT_BRANCH, LinkcodeResolver, LinkcodeSettings};
pub use transform::{SOURCE_LABEL, link_code};

/// Signature fields identifying an object, per domain.
pub const DOMAIN_KEYS: &[(&str, &[&str])] = &[
    ("py", &["module", "fullname"]),
    ("c", &["names"]),
    ("cpp", &["names"]),
    ("js", &["object", "fullname"]),
];

/// Identifying keys of a domain; empty for unknown domains.
pub fn domain_keys(domain: &str) -> &'static [&'static str] {
    DOMAIN_KEYS
        .iter()
        .find(|(name, _)| *name == domain)
        .map_or(&[][..], |(_, keys)| *keys)
}

/// Identifying fields of a signature, with unset fields as empty strings.
///
/// Returns `None` for domains without keys.
pub fn signature_info(domain: &str, signature: &DescSignature) -> Option<BTreeMap<String, String>> {
    let keys = domain_keys(domain);
    if keys.is_empty() {
        return None;
    }
    Some(
        keys.iter()
            .map(|&key| (key.to_owned(), signature.info(key).unwrap_or_default()))
            .collect(),
    )
}

/// Link-to-source error.
#[derive(Debug, thiserror::Error)]
pub enum LinkcodeError {
    #[error("Link to source needs link_code.library or html_context.github_user and github_repo")]
    MissingLibrary,
}

//! Future-Release Synthesizer: a not-yet-tagged release that absorbs the
//! pull requests merged after the latest published one.
use chrono::{DateTime, Utc};

use crate::{
    changelog::types::{Release, ReleaseKind},
    error::{ChangelogError, Result},
};

/// Name, tag and URL of the upcoming release, resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FutureRelease {
    pub name: String,
    pub tag: String,
    pub url: String,
}

impl FutureRelease {
    /// Fails when the upcoming tag is already the latest published one: there
    /// is nothing new to generate a changelog for.
    pub fn ensure_new(&self, latest: Option<&Release>) -> Result<()> {
        if let Some(latest) = latest
            && latest.tag_name.as_deref() == Some(self.tag.as_str())
        {
            return Err(ChangelogError::duplicate_release(&self.tag));
        }

        Ok(())
    }

    /// Synthetic release dated `created_at` with no pull requests yet.
    pub fn synthesize(&self, created_at: DateTime<Utc>) -> Release {
        Release {
            name: Some(self.name.clone()),
            tag_name: Some(self.tag.clone()),
            created_at,
            url: self.url.clone(),
            kind: ReleaseKind::Future,
            pull_requests: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::tests::common::*;

    fn future() -> FutureRelease {
        FutureRelease {
            name: "Version 2".into(),
            tag: "v2".into(),
            url: "https://github.com/biz/buz/releases/tag/v2".into(),
        }
    }

    #[test]
    fn rejects_already_published_tag() {
        let latest = release("v2", "2018-10-23T12:00:00Z");

        let result = future().ensure_new(Some(&latest));

        assert!(matches!(
            result,
            Err(ChangelogError::DuplicateRelease { tag }) if tag == "v2"
        ));
    }

    #[test]
    fn accepts_new_tag() {
        let latest = release("v1", "2018-10-23T12:00:00Z");

        assert!(future().ensure_new(Some(&latest)).is_ok());
        assert!(future().ensure_new(None).is_ok());
    }

    #[test]
    fn synthesizes_empty_future_release() {
        let release = future().synthesize(ts("2018-10-25T00:00:00Z"));

        assert_eq!(release.kind, ReleaseKind::Future);
        assert_eq!(release.title(), Some("Version 2"));
        assert_eq!(release.tag_name.as_deref(), Some("v2"));
        assert_eq!(release.url, "https://github.com/biz/buz/releases/tag/v2");
        assert_eq!(release.created_at, ts("2018-10-25T00:00:00Z"));
        assert!(release.pull_requests.is_empty());
    }
}

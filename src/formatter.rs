//! Markdown rendering of correlated releases.
use crate::changelog::types::{PullRequest, Release};

const HEADER: &str = "# Changelog\n";

/// Markdown chunks in output order: the header, then a heading per release
/// followed by one bullet per pull request.
pub fn format_lines(releases: &[Release]) -> Vec<String> {
    let mut lines = vec![HEADER.to_string()];

    for release in releases {
        lines.push(release_heading(release));

        for pr in &release.pull_requests {
            lines.push(pull_request_line(pr));
        }
    }

    lines
}

pub fn format_changelog(releases: &[Release]) -> String {
    format_lines(releases).concat()
}

fn release_heading(release: &Release) -> String {
    let title = release
        .tag_name
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(release.name.as_deref())
        .unwrap_or_default();

    format!(
        "\n## [{title}]({}) ({})\n\n",
        release.url,
        release.created_at.format("%Y-%m-%d")
    )
}

fn pull_request_line(pr: &PullRequest) -> String {
    format!(
        "- {} [\\#{}]({}) ([{}]({}))\n",
        pr.title, pr.number, pr.url, pr.author.login, pr.author.url
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::{tests::common::*, types::Author};

    fn with_author(mut pr: PullRequest, login: &str) -> PullRequest {
        pr.author = Author {
            login: login.to_string(),
            url: format!("https://github.com/{login}"),
        };
        pr
    }

    #[test]
    fn formats_releases_and_pull_requests() {
        let mut first = release("foo-tag", "2018-10-23T12:00:00Z");
        first.name = Some("foo-name".into());
        first.url = "foo-url".into();
        first.pull_requests = vec![
            with_author(pr(2, "2018-10-23T10:00:00Z"), "foobar"),
            with_author(pr(1, "2018-10-22T20:00:00Z"), "foobiz"),
        ];

        let mut second = release("bar-tag", "2018-10-22T12:00:00Z");
        second.url = "bar-url".into();

        let lines = format_lines(&[first, second]);

        assert_eq!(
            lines,
            vec![
                "# Changelog\n".to_string(),
                "\n## [foo-tag](foo-url) (2018-10-23)\n\n".to_string(),
                "- Pull request 2 [\\#2](https://github.com/biz/buz/pull/2) ([foobar](https://github.com/foobar))\n".to_string(),
                "- Pull request 1 [\\#1](https://github.com/biz/buz/pull/1) ([foobiz](https://github.com/foobiz))\n".to_string(),
                "\n## [bar-tag](bar-url) (2018-10-22)\n\n".to_string(),
            ]
        );
    }

    #[test]
    fn heading_falls_back_to_release_name() {
        let mut release = release("", "2018-10-23T12:00:00Z");
        release.tag_name = None;
        release.name = Some("Upcoming".into());
        release.url = "url".into();

        let output = format_changelog(&[release]);

        assert_eq!(output, "# Changelog\n\n## [Upcoming](url) (2018-10-23)\n\n");
    }

    #[test]
    fn empty_changelog_is_only_the_header() {
        assert_eq!(format_changelog(&[]), "# Changelog\n");
    }
}

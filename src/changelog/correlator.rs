//! Correlator: assigns each pull request to the earliest release created at
//! or after its merge.
//!
//! Release `i` owns the window `(releases[i - 1].created_at,
//! releases[i].created_at]`. Pull requests merged after the last release
//! belong to no release and are handed back to the caller.
use crate::changelog::types::{PullRequest, Release};

/// Single pass over both sequences. `releases` must be sorted ascending by
/// `created_at` and `pull_requests` ascending by `merged_at`. Each release
/// receives its pull requests newest first.
pub fn correlate(
    releases: &mut [Release],
    pull_requests: Vec<PullRequest>,
) -> Vec<PullRequest> {
    let mut buckets: Vec<Vec<PullRequest>> = vec![vec![]; releases.len()];
    let mut unassigned = vec![];
    let mut cursor = 0;

    for pr in pull_requests {
        while cursor < releases.len() && releases[cursor].created_at < pr.merged_at
        {
            cursor += 1;
        }

        match buckets.get_mut(cursor) {
            Some(bucket) => bucket.push(pr),
            None => unassigned.push(pr),
        }
    }

    for (release, bucket) in releases.iter_mut().zip(buckets) {
        release.pull_requests.extend(bucket.into_iter().rev());
    }

    unassigned
}

/// Linear search of the release list for every pull request. Produces the
/// same assignment as [`correlate`] on sorted input, in quadratic time.
pub fn correlate_linear(
    releases: &mut [Release],
    pull_requests: Vec<PullRequest>,
) -> Vec<PullRequest> {
    let mut unassigned = vec![];

    for pr in pull_requests {
        match releases.iter_mut().find(|r| pr.merged_at <= r.created_at) {
            Some(release) => release.pull_requests.insert(0, pr),
            None => unassigned.push(pr),
        }
    }

    unassigned
}

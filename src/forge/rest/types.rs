use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RestRelease {
    pub name: Option<String>,
    pub tag_name: String,
    pub html_url: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct RestUser {
    pub login: String,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub struct RestLabel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RestPullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub merged_at: Option<String>,
    pub updated_at: String,
    pub user: Option<RestUser>,
    #[serde(default)]
    pub labels: Vec<RestLabel>,
}

#[derive(Debug, Deserialize)]
pub struct RestFile {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct RestRepository {
    pub created_at: String,
}

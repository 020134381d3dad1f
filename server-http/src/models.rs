use serde::Serialize;

/// Body of `GET /status`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub redis: bool,
    pub db: bool,
}

/// Body of `GET /stats`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub users: u64,
    pub files: u64,
}

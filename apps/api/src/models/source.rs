use serde::Serialize;

use crate::models::job::JobType;

/// One entry of the hand-maintained source catalog served by `GET /api/discover/sources`.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub website: &'static str,
    pub supported_locations: Vec<&'static str>,
    pub job_types: Vec<JobType>,
}

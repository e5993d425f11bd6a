//! Static description of the sources the service can discover jobs from.

use crate::discovery::adapters::{career_pages, rendered_board, static_board};
use crate::discovery::orchestrator::canonical_source_id;
use crate::models::job::JobType;
use crate::models::source::SourceInfo;

pub fn sources() -> Vec<SourceInfo> {
    vec![
        SourceInfo {
            id: rendered_board::SOURCE_ID,
            name: "JustJoinIT",
            description: "Polish IT job board with tech positions across Poland and remote",
            website: "https://justjoin.it",
            supported_locations: vec!["Poland", "Remote"],
            job_types: vec![JobType::FullTime, JobType::Contract, JobType::Remote],
        },
        SourceInfo {
            id: static_board::SOURCE_ID,
            name: "InHire",
            description: "European tech recruitment platform",
            website: "https://inhire.io",
            supported_locations: vec!["Europe", "Remote"],
            job_types: vec![JobType::FullTime, JobType::Contract],
        },
        SourceInfo {
            id: career_pages::SOURCE_ID,
            name: "Career Pages",
            description: "Openings synthesized from company career pages",
            website: "various",
            supported_locations: vec!["Global", "Remote"],
            job_types: vec![JobType::FullTime, JobType::PartTime, JobType::Contract],
        },
    ]
}

/// Adapter id for a catalog id, alias or display name (`Career Pages`).
pub fn source_id_for(name_or_id: &str) -> Option<&'static str> {
    let id = canonical_source_id(name_or_id);
    sources()
        .into_iter()
        .find(|s| s.id == id || s.name.eq_ignore_ascii_case(name_or_id.trim()))
        .map(|s| s.id)
}

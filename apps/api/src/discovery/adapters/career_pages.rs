//! Adapter for company career pages.
//!
//! Career pages share no markup, so nothing is fetched: each configured
//! company yields a fixed slice of the title pool with company-specific text.

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::discovery::adapters::{AdapterContext, AdapterError, ExtractionError, SiteAdapter};
use crate::discovery::normalizer::{present, FieldDefaults, Normalizer, RawListing};
use crate::models::job::{CompanyTarget, DiscoveryRequest, JobRecord, JobType};

pub const SOURCE_ID: &str = "careerpages";

/// Accepted in requests as another name for `careerpages`.
pub const SOURCE_ALIAS: &str = "companies";

#[derive(Debug, Clone)]
pub struct CareerPagesConfig {
    pub name: String,
    pub companies: Vec<CompanyTarget>,
    pub max_companies: usize,
    pub title_pool: Vec<String>,
    pub titles_per_company: usize,
    /// Name used for `{name, url}` entries that omit the name.
    pub unnamed_company: String,
    pub defaults: FieldDefaults,
}

impl Default for CareerPagesConfig {
    fn default() -> Self {
        Self {
            name: "Career Pages".to_string(),
            companies: vec![
                CompanyTarget::named("GitHub", "https://github.com/about/careers"),
                CompanyTarget::named(
                    "Stack Overflow",
                    "https://stackoverflow.com/company/work-here",
                ),
                CompanyTarget::named("GitLab", "https://about.gitlab.com/jobs/"),
            ],
            max_companies: 3,
            title_pool: [
                "Senior Software Engineer",
                "Frontend Developer",
                "Backend Developer",
                "DevOps Engineer",
                "Product Manager",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            titles_per_company: 3,
            unnamed_company: "Tech Company".to_string(),
            defaults: FieldDefaults {
                title: "Software Engineer".to_string(),
                company: "Tech Company".to_string(),
                location: "Remote / Office".to_string(),
                salary: Some("$80,000 - $150,000".to_string()),
                undisclosed_salary: None,
                description: "Join {company} as a {title}. We're looking for passionate developers to help build the future of technology. Work with cutting-edge tools and make a real impact.".to_string(),
                requirements: Vec::new(),
                job_type: JobType::FullTime,
                source_url: String::new(),
                max_posted_age_days: 7,
            },
        }
    }
}

/// A career page with a resolved display name.
#[derive(Debug, Clone, PartialEq)]
struct Company {
    name: String,
    url: String,
}

pub struct CareerPagesAdapter {
    config: CareerPagesConfig,
}

impl CareerPagesAdapter {
    pub fn new(config: CareerPagesConfig) -> Self {
        Self { config }
    }

    fn resolve(&self, index: usize, target: &CompanyTarget) -> Result<Company, ExtractionError> {
        match target {
            CompanyTarget::Url(url) => Ok(Company {
                name: host_name(url).ok_or_else(|| ExtractionError::UnnamedCompany {
                    index,
                    url: url.clone(),
                })?,
                url: url.clone(),
            }),
            CompanyTarget::Named { name, url } => Ok(Company {
                name: present(name.clone())
                    .unwrap_or_else(|| self.config.unnamed_company.clone()),
                url: url.clone(),
            }),
        }
    }

    fn listings_for(&self, company: &Company) -> Vec<RawListing> {
        self.config
            .title_pool
            .iter()
            .take(self.config.titles_per_company)
            .map(|title| RawListing {
                title: Some(title.clone()),
                company: Some(company.name.clone()),
                link: Some(company.url.clone()),
                requirements: requirements_for(title),
                ..RawListing::default()
            })
            .collect()
    }
}

#[async_trait]
impl SiteAdapter for CareerPagesAdapter {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_name(&self) -> &str {
        &self.config.name
    }

    async fn scrape(
        &self,
        request: &DiscoveryRequest,
        ctx: &AdapterContext<'_>,
    ) -> Result<Vec<JobRecord>, AdapterError> {
        let targets = if request.companies.is_empty() {
            &self.config.companies
        } else {
            &request.companies
        };

        let resolved: Vec<Result<Company, ExtractionError>> = targets
            .iter()
            .take(self.config.max_companies)
            .enumerate()
            .map(|(index, target)| self.resolve(index, target))
            .collect();

        // Each listing keeps the display name of the company it was generated for.
        let mut listings: Vec<(String, RawListing)> = Vec::new();
        for (i, company) in resolved.into_iter().enumerate() {
            if i > 0 {
                ctx.politeness.delay().await;
            }
            let company = match company {
                Ok(company) => company,
                Err(e) => {
                    warn!(source = SOURCE_ID, error = %e, "Skipping company");
                    continue;
                }
            };
            debug!(source = SOURCE_ID, company = %company.name, "Generating career page listings");

            let source_name = format!("{} Careers", company.name);
            listings.extend(
                self.listings_for(&company)
                    .into_iter()
                    .map(|raw| (source_name.clone(), raw)),
            );
        }

        Ok(ctx
            .politeness
            .cap(listings)
            .into_iter()
            .enumerate()
            .map(|(ordinal, (source_name, raw))| {
                Normalizer {
                    source_id: SOURCE_ID,
                    source_name: &source_name,
                    defaults: &self.config.defaults,
                    clock: ctx.clock,
                    id_scheme: ctx.id_scheme,
                }
                .normalize(ordinal, raw)
            })
            .collect())
    }
}

/// Host of `url` without a leading `www.`, when it has one.
fn host_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

fn requirements_for(title: &str) -> Vec<String> {
    vec![
        format!("3+ years of experience in {} role", title.to_lowercase()),
        "Strong programming skills".to_string(),
        "Experience with modern development practices".to_string(),
        "Excellent communication skills".to_string(),
        "Bachelor's degree or equivalent experience".to_string(),
    ]
}

use listings_search_shared::{JobDocument, JobRecord};

use super::sanitize::sanitize_description;

/// Character budget for job descriptions.
pub const JOB_DESCRIPTION_BUDGET: usize = 500;

/// Map a job record (with resolved relations) to its index document.
///
/// Absent booleans become `false` and absent lists become empty, so every
/// document carries the same shape. The salary floor falls back to the
/// maximum when no minimum is set.
pub fn job_document(record: &JobRecord) -> JobDocument {
    JobDocument {
        id: record.id.clone(),
        title: record.title.clone(),
        description: record
            .description
            .as_deref()
            .map(|html| sanitize_description(html, JOB_DESCRIPTION_BUDGET))
            .unwrap_or_default(),
        company_name: record.company.as_ref().map(|c| c.name.clone()),
        company_slug: record.company.as_ref().map(|c| c.slug.clone()),
        region_code: record.region.as_ref().map(|r| r.code.clone()),
        city: record.city.clone(),
        country: record.country.clone(),
        remote: record.remote.unwrap_or(false),
        skills: record.skills.clone().unwrap_or_default(),
        tags: record.tags.clone().unwrap_or_default(),
        salary_min: record.salary_min.or(record.salary_max),
        salary_max: record.salary_max,
        currency: record.currency.clone(),
        experience: record.experience.clone(),
        url: record.url.clone(),
        posted_at: record.posted_at.timestamp(),
    }
}

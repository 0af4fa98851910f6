//! Translation of validated queries into engine filter and sort expressions.

use listings_search_shared::{EventQuery, EventSort, JobQuery, JobSort};

/// Quote a value for a filter expression, escaping `\` and `"`.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '\\' || c == '"' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn eq(field: &str, value: &str) -> String {
    format!("{} = {}", field, quote(value))
}

/// Free text, or `None` when blank.
pub fn text_query(q: &Option<String>) -> Option<String> {
    q.as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
}

/// Filter expressions for a job query. Expressions are conjunctive, so every
/// listed skill and every listed tag must be present.
pub fn job_filters(query: &JobQuery) -> Vec<String> {
    let mut filters = Vec::new();

    if let Some(city) = &query.city {
        filters.push(eq("city", city));
    }
    if let Some(region) = &query.region {
        filters.push(eq("regionCode", region));
    }
    if let Some(country) = &query.country {
        filters.push(eq("country", country));
    }
    if let Some(remote) = query.remote {
        filters.push(format!("remote = {}", remote));
    }
    filters.extend(query.skills.iter().map(|skill| eq("skills", skill)));
    filters.extend(query.tags.iter().map(|tag| eq("tags", tag)));
    if let Some(salary) = query.salary_min {
        filters.push(format!("salaryMin >= {}", salary));
    }
    if let Some(currency) = &query.currency {
        filters.push(eq("currency", currency));
    }
    if let Some(experience) = &query.experience {
        filters.push(eq("experience", experience));
    }

    filters
}

/// Filter expressions for an event query.
pub fn event_filters(query: &EventQuery) -> Vec<String> {
    let mut filters = Vec::new();

    if let Some(city) = &query.city {
        filters.push(eq("city", city));
    }
    if let Some(region) = &query.region {
        filters.push(eq("regionCode", region));
    }
    if let Some(country) = &query.country {
        filters.push(eq("country", country));
    }
    if let Some(online) = query.online {
        filters.push(format!("online = {}", online));
    }
    filters.extend(query.tags.iter().map(|tag| eq("tags", tag)));

    filters
}

/// Sort keys for a job sort; empty means relevance ranking.
pub fn job_sort(sort: JobSort) -> Vec<String> {
    match sort {
        JobSort::Relevant => Vec::new(),
        JobSort::Recent => vec!["postedAt:desc".to_string()],
        JobSort::SalaryDesc => vec!["salaryMin:desc".to_string()],
    }
}

/// Sort keys for an event sort; empty means relevance ranking.
pub fn event_sort(sort: EventSort) -> Vec<String> {
    match sort {
        EventSort::Relevant => Vec::new(),
        EventSort::Upcoming => vec!["startsAt:asc".to_string()],
        EventSort::Recent => vec!["startsAt:desc".to_string()],
    }
}

//! Relational queries used when no search index is configured.
//!
//! Matching here is looser than on the index for tags and
//! experience: a tag or an experience level also matches when it appears in
//! the title or description. Skills stay strict on both paths.

use listings_search_repository::{Column, OrderBy, Predicate, StoreQuery};
use listings_search_shared::{EntityKind, EventQuery, EventSort, JobQuery, JobSort};

use super::filters::text_query;

fn text_match(q: &str, columns: &[Column]) -> Predicate {
    Predicate::Any(
        columns
            .iter()
            .map(|column| Predicate::Contains(*column, q.to_string()))
            .collect(),
    )
}

/// Any tag, as a list element or inside the title or description.
fn soft_tags(tags: &[String]) -> Predicate {
    Predicate::Any(
        tags.iter()
            .flat_map(|tag| {
                [
                    Predicate::HasElement(Column::Tags, tag.clone()),
                    Predicate::Contains(Column::Title, tag.clone()),
                    Predicate::Contains(Column::Description, tag.clone()),
                ]
            })
            .collect(),
    )
}

fn locality(
    mut query: StoreQuery,
    city: &Option<String>,
    region: &Option<String>,
    country: &Option<String>,
) -> StoreQuery {
    if let Some(city) = city {
        query = query.filter(Predicate::Eq(Column::City, city.as_str().into()));
    }
    if let Some(region) = region {
        query = query.filter(Predicate::Eq(Column::RegionCode, region.as_str().into()));
    }
    if let Some(country) = country {
        query = query.filter(Predicate::Eq(Column::Country, country.as_str().into()));
    }
    query
}

/// Relational equivalent of a job query.
pub fn job_store_query(query: &JobQuery) -> StoreQuery {
    let mut store_query = StoreQuery::new(EntityKind::Job);

    if let Some(q) = text_query(&query.q) {
        store_query = store_query.filter(text_match(
            &q,
            &[Column::Title, Column::Description, Column::CompanyName],
        ));
    }
    store_query = locality(store_query, &query.city, &query.region, &query.country);
    if let Some(remote) = query.remote {
        store_query = store_query.filter(Predicate::Eq(Column::Remote, remote.into()));
    }
    if !query.skills.is_empty() {
        store_query = store_query.filter(Predicate::All(
            query
                .skills
                .iter()
                .map(|skill| Predicate::HasElement(Column::Skills, skill.clone()))
                .collect(),
        ));
    }
    if !query.tags.is_empty() {
        store_query = store_query.filter(soft_tags(&query.tags));
    }
    if let Some(salary) = query.salary_min {
        store_query = store_query.filter(Predicate::Gte(Column::SalaryFloor, salary));
    }
    if let Some(currency) = &query.currency {
        store_query = store_query.filter(Predicate::Eq(Column::Currency, currency.as_str().into()));
    }
    if let Some(experience) = &query.experience {
        store_query = store_query.filter(Predicate::Any(vec![
            Predicate::Eq(Column::Experience, experience.as_str().into()),
            Predicate::Contains(Column::Title, experience.clone()),
            Predicate::Contains(Column::Description, experience.clone()),
        ]));
    }

    // No relevance ranking in the store; newest first stands in for it.
    match query.sort {
        JobSort::Relevant | JobSort::Recent => store_query.order_by(OrderBy::desc(Column::PostedAt)),
        JobSort::SalaryDesc => store_query
            .order_by(OrderBy::desc(Column::SalaryFloor))
            .order_by(OrderBy::desc(Column::PostedAt)),
    }
}

/// Relational equivalent of an event query.
pub fn event_store_query(query: &EventQuery) -> StoreQuery {
    let mut store_query = StoreQuery::new(EntityKind::Event);

    if let Some(q) = text_query(&query.q) {
        store_query = store_query.filter(text_match(
            &q,
            &[Column::Title, Column::Description, Column::CompanyName],
        ));
    }
    store_query = locality(store_query, &query.city, &query.region, &query.country);
    if let Some(online) = query.online {
        store_query = store_query.filter(Predicate::Eq(Column::Online, online.into()));
    }
    if !query.tags.is_empty() {
        store_query = store_query.filter(soft_tags(&query.tags));
    }

    match query.sort {
        EventSort::Relevant | EventSort::Upcoming => {
            store_query.order_by(OrderBy::asc(Column::StartsAt))
        }
        EventSort::Recent => store_query.order_by(OrderBy::desc(Column::StartsAt)),
    }
}

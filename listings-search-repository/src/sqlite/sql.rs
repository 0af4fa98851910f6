//! Translation of `StoreQuery` into SQLite SQL.
//!
//! The listing row is always aliased `l`, its company `c` and its region `r`.

use rusqlite::types::Value as SqlValue;

use crate::errors::StoreError;
use crate::store_query::{Column, Direction, Predicate, Scalar, StoreQuery};
use listings_search_shared::EntityKind;

pub(crate) const JOB_COLUMNS: &str = "l.id, l.title, l.description, c.id, c.name, c.slug, \
     r.id, r.code, r.name, l.city, l.country, l.remote, l.skills, l.tags, l.salary_min, \
     l.salary_max, l.currency, l.experience, l.url, l.posted_at";

pub(crate) const EVENT_COLUMNS: &str = "l.id, l.title, l.description, c.id, c.name, c.slug, \
     r.id, r.code, r.name, l.city, l.country, l.online, l.venue, l.tags, l.starts_at, \
     l.ends_at, l.url";

/// `FROM` clause with relations joined.
pub(crate) fn from_clause(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Job => {
            "FROM job l LEFT JOIN company c ON c.id = l.company_id \
             LEFT JOIN region r ON r.id = l.region_id"
        }
        EntityKind::Event => {
            "FROM event l LEFT JOIN company c ON c.id = l.company_id \
             LEFT JOIN region r ON r.id = l.region_id"
        }
    }
}

fn column_sql(kind: EntityKind, column: Column) -> Result<&'static str, StoreError> {
    let sql = match (kind, column) {
        (_, Column::Title) => "l.title",
        (_, Column::Description) => "l.description",
        (_, Column::CompanyName) => "c.name",
        (_, Column::City) => "l.city",
        (_, Column::Country) => "l.country",
        (_, Column::RegionCode) => "r.code",
        (_, Column::Tags) => "l.tags",
        (EntityKind::Job, Column::Remote) => "COALESCE(l.remote, 0)",
        (EntityKind::Job, Column::Skills) => "l.skills",
        (EntityKind::Job, Column::SalaryFloor) => "COALESCE(l.salary_min, l.salary_max)",
        (EntityKind::Job, Column::Currency) => "l.currency",
        (EntityKind::Job, Column::Experience) => "l.experience",
        (EntityKind::Job, Column::PostedAt) => "l.posted_at",
        (EntityKind::Event, Column::Online) => "COALESCE(l.online, 0)",
        (EntityKind::Event, Column::StartsAt) => "l.starts_at",
        (kind, column) => {
            return Err(StoreError::mapping(format!(
                "Column {:?} does not exist on {}",
                column, kind
            )))
        }
    };
    Ok(sql)
}

fn is_array(column: Column) -> bool {
    matches!(column, Column::Skills | Column::Tags)
}

fn predicate_sql(
    kind: EntityKind,
    predicate: &Predicate,
    params: &mut Vec<SqlValue>,
) -> Result<String, StoreError> {
    let sql = match predicate {
        Predicate::Eq(column, value) => {
            let col = column_sql(kind, *column)?;
            match value {
                Scalar::Text(text) => {
                    params.push(SqlValue::Text(text.clone()));
                    format!("{} = ? COLLATE NOCASE", col)
                }
                Scalar::Bool(flag) => {
                    params.push(SqlValue::Integer(i64::from(*flag)));
                    format!("{} = ?", col)
                }
                Scalar::Int(number) => {
                    params.push(SqlValue::Integer(*number));
                    format!("{} = ?", col)
                }
            }
        }
        Predicate::Contains(column, needle) => {
            let col = column_sql(kind, *column)?;
            params.push(SqlValue::Text(needle.clone()));
            format!("instr(lower({}), lower(?)) > 0", col)
        }
        Predicate::HasElement(column, element) => {
            if !is_array(*column) {
                return Err(StoreError::mapping(format!(
                    "Column {:?} is not an array column",
                    column
                )));
            }
            let col = column_sql(kind, *column)?;
            params.push(SqlValue::Text(element.clone()));
            format!(
                "EXISTS (SELECT 1 FROM json_each({}) WHERE lower(json_each.value) = lower(?))",
                col
            )
        }
        Predicate::Gte(column, bound) => {
            let col = column_sql(kind, *column)?;
            params.push(SqlValue::Integer(*bound));
            format!("{} >= ?", col)
        }
        Predicate::Any(parts) => {
            if parts.is_empty() {
                return Ok("0".to_string());
            }
            let parts = parts
                .iter()
                .map(|p| predicate_sql(kind, p, params))
                .collect::<Result<Vec<_>, _>>()?;
            format!("({})", parts.join(" OR "))
        }
        Predicate::All(parts) => {
            if parts.is_empty() {
                return Ok("1".to_string());
            }
            let parts = parts
                .iter()
                .map(|p| predicate_sql(kind, p, params))
                .collect::<Result<Vec<_>, _>>()?;
            format!("({})", parts.join(" AND "))
        }
    };
    Ok(sql)
}

/// ` WHERE ...` for the query's predicates, or an empty string.
pub(crate) fn where_clause(query: &StoreQuery) -> Result<(String, Vec<SqlValue>), StoreError> {
    let mut params = Vec::new();
    if query.predicates.is_empty() {
        return Ok((String::new(), params));
    }

    let parts = query
        .predicates
        .iter()
        .map(|p| predicate_sql(query.kind, p, &mut params))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((format!(" WHERE {}", parts.join(" AND ")), params))
}

/// ` ORDER BY ...` with nulls last and the id as final tiebreak.
pub(crate) fn order_clause(query: &StoreQuery) -> Result<String, StoreError> {
    let mut keys = Vec::with_capacity(query.order.len() * 2 + 1);
    for order in &query.order {
        let col = column_sql(query.kind, order.column)?;
        let direction = match order.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        keys.push(format!("{} IS NULL", col));
        keys.push(format!("{} {}", col, direction));
    }
    keys.push("l.id ASC".to_string());
    Ok(format!(" ORDER BY {}", keys.join(", ")))
}

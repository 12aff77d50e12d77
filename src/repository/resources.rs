//! Library resources repository: faceted search, detail loading and curation.
//!
//! Joined relations (authors, subjects, keywords) are matched through `EXISTS`
//! subqueries, so a resource with several matching authors or keywords is
//! still returned once. Relations for a page of results are loaded in one
//! batched query per relation rather than per row.

use std::collections::HashMap;

use sqlx::{Pool, Postgres, QueryBuilder, Row, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::AuthorRef,
        enums::Availability,
        keyword::Keyword,
        resource::{Resource, ResourceInput, ResourceRow, ResourceSummary, SubjectRef},
        search::{contains_pattern, PageInfo, ResourceFilter, YearBounds},
    },
};

const RESOURCE_SELECT: &str = r#"
    SELECT r.id, r.title, r.resource_type_id,
           rt.name AS resource_type_name, rt.icon AS resource_type_icon,
           r.description, r.abstract, r.publication_year, r.publisher,
           r.isbn, r.doi, r.call_number, r.location, r.availability,
           r.url, r.pages, r.language, r.date_added, r.date_updated,
           r.view_count, r.download_count
    FROM library_resources r
    JOIN resource_types rt ON rt.id = r.resource_type_id
"#;

/// Append the WHERE clause for `filter`. Facets are ANDed together; the
/// free-text facet ORs over the resource's own text columns and its authors'
/// and keywords' names.
pub fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ResourceFilter) {
    qb.push(" WHERE TRUE");

    if let Some(ref text) = filter.text {
        let pattern = contains_pattern(text);
        qb.push(" AND (r.title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR r.description ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR r.abstract ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(
            " OR EXISTS (SELECT 1 FROM resource_authors ra JOIN authors a ON a.id = ra.author_id \
             WHERE ra.resource_id = r.id AND (a.first_name ILIKE ",
        );
        qb.push_bind(pattern.clone());
        qb.push(" OR a.last_name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(
            ")) OR EXISTS (SELECT 1 FROM resource_keywords rk JOIN keywords k ON k.id = rk.keyword_id \
             WHERE rk.resource_id = r.id AND k.word ILIKE ",
        );
        qb.push_bind(pattern);
        qb.push("))");
    }

    if let Some(resource_type_id) = filter.resource_type_id {
        qb.push(" AND r.resource_type_id = ");
        qb.push_bind(resource_type_id);
    }

    if let Some(subject_id) = filter.subject_id {
        qb.push(" AND EXISTS (SELECT 1 FROM resource_subjects rs WHERE rs.resource_id = r.id AND rs.subject_id = ");
        qb.push_bind(subject_id);
        qb.push(")");
    }

    if let Some(year_range) = filter.year_range {
        match year_range.bounds() {
            YearBounds::Between(start, end) => {
                qb.push(" AND r.publication_year >= ");
                qb.push_bind(start);
                qb.push(" AND r.publication_year <= ");
                qb.push_bind(end);
            }
            YearBounds::Before(limit) => {
                qb.push(" AND r.publication_year < ");
                qb.push_bind(limit);
            }
        }
    }

    if let Some(availability) = filter.availability {
        qb.push(" AND r.availability = ");
        qb.push_bind(availability);
    }
}

#[derive(Clone)]
pub struct ResourcesRepository {
    pool: Pool<Postgres>,
}

impl ResourcesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// Count resources matching the filter
    pub async fn count_matching(&self, filter: &ResourceFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM library_resources r");
        push_filter(&mut qb, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    /// Search resources, returning one page and the resolved page window
    pub async fn search(
        &self,
        filter: &ResourceFilter,
        requested_page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<ResourceSummary>, PageInfo)> {
        let total = self.count_matching(filter).await?;
        let page = PageInfo::resolve(requested_page, per_page, total);

        if total == 0 {
            return Ok((Vec::new(), page));
        }

        let mut qb = QueryBuilder::<Postgres>::new(RESOURCE_SELECT);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY ");
        qb.push(filter.sort.order_clause());
        qb.push(" LIMIT ");
        qb.push_bind(page.per_page);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb.build_query_as::<ResourceRow>().fetch_all(&self.pool).await?;
        let summaries = self.summarize(rows).await?;

        Ok((summaries, page))
    }

    /// Attach authors and subjects to a batch of rows, keeping row order
    pub async fn summarize(&self, rows: Vec<ResourceRow>) -> AppResult<Vec<ResourceSummary>> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut authors = self.authors_for(&ids).await?;
        let mut subjects = self.subjects_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_summary(
                    authors.remove(&id).unwrap_or_default(),
                    subjects.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }

    /// Summaries for the given ids, in the order of `ids`
    pub async fn summaries_by_ids(&self, ids: &[i32]) -> AppResult<Vec<ResourceSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("{} WHERE r.id = ANY($1)", RESOURCE_SELECT);
        let rows = sqlx::query_as::<_, ResourceRow>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_id: HashMap<i32, ResourceSummary> = self
            .summarize(rows)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn authors_for(&self, resource_ids: &[i32]) -> AppResult<HashMap<i32, Vec<AuthorRef>>> {
        let rows = sqlx::query(
            r#"
            SELECT ra.resource_id, a.id, a.first_name, a.last_name
            FROM resource_authors ra
            JOIN authors a ON a.id = ra.author_id
            WHERE ra.resource_id = ANY($1)
            ORDER BY a.last_name, a.first_name
            "#,
        )
        .bind(resource_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<i32, Vec<AuthorRef>> = HashMap::new();
        for r in rows {
            map.entry(r.get("resource_id")).or_default().push(AuthorRef {
                id: r.get("id"),
                first_name: r.get("first_name"),
                last_name: r.get("last_name"),
            });
        }
        Ok(map)
    }

    async fn subjects_for(&self, resource_ids: &[i32]) -> AppResult<HashMap<i32, Vec<SubjectRef>>> {
        let rows = sqlx::query(
            r#"
            SELECT rs.resource_id, s.id, s.name
            FROM resource_subjects rs
            JOIN subjects s ON s.id = rs.subject_id
            WHERE rs.resource_id = ANY($1)
            ORDER BY s.name
            "#,
        )
        .bind(resource_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<i32, Vec<SubjectRef>> = HashMap::new();
        for r in rows {
            map.entry(r.get("resource_id")).or_default().push(SubjectRef {
                id: r.get("id"),
                name: r.get("name"),
            });
        }
        Ok(map)
    }

    async fn keywords_for(&self, resource_id: i32) -> AppResult<Vec<Keyword>> {
        let keywords = sqlx::query_as::<_, Keyword>(
            r#"
            SELECT k.id, k.word, k.frequency
            FROM resource_keywords rk
            JOIN keywords k ON k.id = rk.keyword_id
            WHERE rk.resource_id = $1
            ORDER BY k.frequency DESC, k.word
            "#,
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(keywords)
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get a resource with all its relations
    pub async fn get_by_id(&self, id: i32) -> AppResult<Resource> {
        let query = format!("{} WHERE r.id = $1", RESOURCE_SELECT);
        let row = sqlx::query_as::<_, ResourceRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource with id {} not found", id)))?;

        let ids = [id];
        let authors = self.authors_for(&ids).await?.remove(&id).unwrap_or_default();
        let subjects = self.subjects_for(&ids).await?.remove(&id).unwrap_or_default();
        let keywords = self.keywords_for(id).await?;

        Ok(row.into_resource(authors, subjects, keywords))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM library_resources WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Bump the view counter in place. Returns false when the resource does not exist.
    pub async fn increment_view_count(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("UPDATE library_resources SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Other resources sharing at least one subject with `id`
    pub async fn related(&self, id: i32, limit: i64) -> AppResult<Vec<ResourceSummary>> {
        let query = format!(
            r#"{}
            WHERE r.id <> $1
              AND EXISTS (
                  SELECT 1 FROM resource_subjects rs
                  JOIN resource_subjects own ON own.subject_id = rs.subject_id
                  WHERE rs.resource_id = r.id AND own.resource_id = $1
              )
            ORDER BY r.date_added DESC, r.id DESC
            LIMIT $2
            "#,
            RESOURCE_SELECT
        );
        let rows = sqlx::query_as::<_, ResourceRow>(&query)
            .bind(id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        self.summarize(rows).await
    }

    /// Most viewed resources
    pub async fn most_viewed(&self, limit: i64) -> AppResult<Vec<ResourceSummary>> {
        let query = format!(
            "{} ORDER BY r.view_count DESC, r.date_added DESC, r.id DESC LIMIT $1",
            RESOURCE_SELECT
        );
        let rows = sqlx::query_as::<_, ResourceRow>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        self.summarize(rows).await
    }

    pub async fn count_all(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM library_resources")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn count_by_availability(&self, availability: Availability) -> AppResult<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM library_resources WHERE availability = $1")
                .bind(availability)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    // =========================================================================
    // CREATE / UPDATE / DELETE
    // =========================================================================

    /// Create a resource and link its authors, subjects and keywords
    pub async fn create(&self, input: &ResourceInput) -> AppResult<Resource> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO library_resources (
                title, resource_type_id, description, abstract, publication_year,
                publisher, isbn, doi, call_number, location, availability,
                url, pages, language
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(input.resource_type_id)
        .bind(&input.description)
        .bind(&input.abstract_)
        .bind(input.publication_year)
        .bind(&input.publisher)
        .bind(&input.isbn)
        .bind(&input.doi)
        .bind(&input.call_number)
        .bind(&input.location)
        .bind(input.availability)
        .bind(&input.url)
        .bind(input.pages)
        .bind(&input.language)
        .fetch_one(&mut *tx)
        .await?;

        Self::sync_relations(&mut tx, id, input).await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Replace a resource's fields and relations
    pub async fn update(&self, id: i32, input: &ResourceInput) -> AppResult<Resource> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE library_resources SET
                title = $1, resource_type_id = $2, description = $3, abstract = $4,
                publication_year = $5, publisher = $6, isbn = $7, doi = $8,
                call_number = $9, location = $10, availability = $11, url = $12,
                pages = $13, language = $14, date_updated = NOW()
            WHERE id = $15
            "#,
        )
        .bind(&input.title)
        .bind(input.resource_type_id)
        .bind(&input.description)
        .bind(&input.abstract_)
        .bind(input.publication_year)
        .bind(&input.publisher)
        .bind(&input.isbn)
        .bind(&input.doi)
        .bind(&input.call_number)
        .bind(&input.location)
        .bind(input.availability)
        .bind(&input.url)
        .bind(input.pages)
        .bind(&input.language)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Resource with id {} not found", id)));
        }

        Self::sync_relations(&mut tx, id, input).await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    async fn sync_relations(
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        input: &ResourceInput,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM resource_authors WHERE resource_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO resource_authors (resource_id, author_id) \
             SELECT $1, UNNEST($2::int[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&input.author_ids)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM resource_subjects WHERE resource_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO resource_subjects (resource_id, subject_id) \
             SELECT $1, UNNEST($2::int[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&input.subject_ids)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM resource_keywords WHERE resource_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO resource_keywords (resource_id, keyword_id) \
             SELECT $1, UNNEST($2::int[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&input.keyword_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Delete a resource (relations and favorites cascade)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM library_resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Resource with id {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search::{SortBy, YearRange};

    fn sql_for(filter: &ResourceFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM library_resources r");
        push_filter(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_filter_has_no_predicates() {
        let sql = sql_for(&ResourceFilter::default());
        assert!(sql.ends_with(" WHERE TRUE"));
        assert!(!sql.contains('$'));
    }

    #[test]
    fn test_text_searches_related_fields_without_joins() {
        let sql = sql_for(&ResourceFilter {
            text: Some("turing".into()),
            ..Default::default()
        });
        for column in ["r.title", "r.description", "r.abstract", "a.first_name", "a.last_name", "k.word"] {
            assert!(sql.contains(&format!("{} ILIKE", column)), "missing {}", column);
        }
        // relations are matched with EXISTS so joined rows never multiply results
        assert_eq!(sql.matches("EXISTS").count(), 2);
        assert!(!sql.contains("LEFT JOIN"));
        assert!(sql.contains("$6"));
        assert!(!sql.contains("$7"));
    }

    #[test]
    fn test_facets_compose_conjunctively() {
        let sql = sql_for(&ResourceFilter {
            text: None,
            resource_type_id: Some(1),
            subject_id: Some(4),
            year_range: Some(YearRange::From2010To2014),
            availability: Some(Availability::Available),
            sort: SortBy::TitleAsc,
        });
        assert!(sql.contains("r.resource_type_id = $1"));
        assert!(sql.contains("rs.subject_id = $2"));
        assert!(sql.contains("r.publication_year >= $3 AND r.publication_year <= $4"));
        assert!(sql.contains("r.availability = $5"));
        assert_eq!(sql.matches(" AND r.").count(), 4);
        assert!(!sql.contains(" OR "));
    }

    #[test]
    fn test_before_2000_is_exclusive_upper_bound() {
        let sql = sql_for(&ResourceFilter {
            year_range: Some(YearRange::Before2000),
            ..Default::default()
        });
        assert!(sql.contains("r.publication_year < $1"));
        assert!(!sql.contains(">="));
    }

    #[test]
    fn test_text_and_facets_keep_text_grouped() {
        let sql = sql_for(&ResourceFilter {
            text: Some("x".into()),
            availability: Some(Availability::Digital),
            ..Default::default()
        });
        let text_start = sql.find(" AND (r.title").unwrap();
        let availability = sql.find(" AND r.availability").unwrap();
        assert!(text_start < availability);
        assert!(sql.contains("r.availability = $7"));
    }
}

//! A [`QueryExecutor`] over rows held in memory.

use std::borrow::Cow;
use std::cmp::Ordering;

use async_trait::async_trait;

use super::query::{PageQuery, QueryExecutor, QueryFilter, SortDirection, SortOrder};
use crate::filter::{
    compile_with, ColumnResolver, FilterError, FilterResult, ParseOptions, Predicate,
    PredicateEvaluator, Row, Schema, Value,
};

/// An in-memory table with a fixed schema.
///
/// Text filters are compiled against the table's schema, so unknown
/// fields and bad values surface as [`FilterError`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    schema: Schema,
    rows: Vec<Row>,
    options: ParseOptions,
}

impl MemoryTable {
    /// Creates a table from typed rows.
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows,
            options: ParseOptions::default(),
        }
    }

    /// Creates a table from JSON objects.
    ///
    /// Without an explicit schema the column types are inferred from the
    /// data.
    pub fn from_json(
        objects: &[serde_json::Map<String, serde_json::Value>],
        schema: Option<Schema>,
    ) -> FilterResult<Self> {
        let schema = schema.unwrap_or_else(|| Schema::infer(objects));
        let rows = objects
            .iter()
            .map(|object| schema.row_from_json(object))
            .collect::<FilterResult<Vec<_>>>()?;
        Ok(Self::new(schema, rows))
    }

    /// Sets the parse options used for text filters.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// The table's schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// All rows, in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn predicate<'a>(
        &self,
        filter: Option<&'a QueryFilter>,
    ) -> FilterResult<Option<Cow<'a, Predicate>>> {
        match filter {
            None => Ok(None),
            Some(QueryFilter::Predicate(predicate)) => Ok(Some(Cow::Borrowed(predicate))),
            Some(QueryFilter::Text(text)) => {
                Ok(compile_with(text, &self.schema, self.options)?.map(Cow::Owned))
            }
        }
    }

    /// Rows matching `filter`, in insertion order.
    pub fn matching(&self, filter: Option<&QueryFilter>) -> FilterResult<Vec<&Row>> {
        let predicate = self.predicate(filter)?;
        Ok(match predicate.as_deref() {
            None => self.rows.iter().collect(),
            Some(predicate) => PredicateEvaluator::new(predicate).filter_rows(&self.rows),
        })
    }

    fn sort(&self, rows: &mut [&Row], order: &SortOrder) -> FilterResult<()> {
        if self.schema.column_type(&order.column).is_none() {
            return Err(FilterError::unknown_field(order.column.clone()));
        }
        rows.sort_by(|a, b| {
            compare_for_sort(
                a.get(&order.column).unwrap_or(&Value::Null),
                b.get(&order.column).unwrap_or(&Value::Null),
                order.direction,
            )
        });
        Ok(())
    }
}

/// Orders two values for sorting; NULLs go last in either direction.
fn compare_for_sort(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = a.compare(b).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

#[async_trait]
impl QueryExecutor for MemoryTable {
    type Row = Row;
    type Error = FilterError;

    fn columns(&self) -> &dyn ColumnResolver {
        &self.schema
    }

    fn parse_options(&self) -> ParseOptions {
        self.options
    }

    async fn count(&self, filter: Option<&QueryFilter>) -> Result<u64, FilterError> {
        Ok(self.matching(filter)?.len() as u64)
    }

    async fn fetch(&self, query: &PageQuery) -> Result<Vec<Row>, FilterError> {
        let mut rows = self.matching(query.filter.as_ref())?;
        if let Some(order) = &query.order {
            self.sort(&mut rows, order)?;
        }

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        let page: Vec<Row> = rows.into_iter().skip(offset).take(limit).cloned().collect();

        tracing::debug!(
            offset = query.offset,
            limit = ?query.limit,
            rows = page.len(),
            "fetched rows from memory table"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ColumnType;

    fn table() -> MemoryTable {
        let schema = Schema::new()
            .with_column("id", ColumnType::Integer)
            .with_column("name", ColumnType::Text);
        let rows = [(1, Some("carol")), (2, None), (3, Some("alice")), (4, Some("bob"))]
            .into_iter()
            .map(|(id, name)| {
                let mut row = Row::new();
                row.insert("id".to_string(), Value::Int(id));
                row.insert(
                    "name".to_string(),
                    name.map(|n| Value::Text(n.to_string())).unwrap_or(Value::Null),
                );
                row
            })
            .collect();
        MemoryTable::new(schema, rows)
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter()
            .filter_map(|row| match row.get("id") {
                Some(Value::Int(id)) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn query(filter: Option<&str>, order: Option<(&str, SortDirection)>) -> PageQuery {
        PageQuery {
            filter: filter.map(|f| QueryFilter::Text(f.to_string())),
            offset: 0,
            limit: None,
            order: order.map(|(column, direction)| SortOrder {
                column: column.to_string(),
                direction,
            }),
        }
    }

    #[tokio::test]
    async fn test_count_with_text_filter() {
        let table = table();
        let filter = QueryFilter::Text("id:gte:2".to_string());
        assert_eq!(table.count(Some(&filter)).await.unwrap(), 3);
        assert_eq!(table.count(None).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_sort_puts_nulls_last() {
        let table = table();
        let asc = table.fetch(&query(None, Some(("name", SortDirection::Asc)))).await.unwrap();
        assert_eq!(ids(&asc), vec![3, 4, 1, 2]);

        let desc = table.fetch(&query(None, Some(("name", SortDirection::Desc)))).await.unwrap();
        assert_eq!(ids(&desc), vec![1, 4, 3, 2]);
    }

    #[tokio::test]
    async fn test_offset_and_limit() {
        let table = table();
        let mut q = query(None, Some(("id", SortDirection::Asc)));
        q.offset = 1;
        q.limit = Some(2);
        assert_eq!(ids(&table.fetch(&q).await.unwrap()), vec![2, 3]);

        q.offset = 10;
        assert!(table.fetch(&q).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_errors_propagate() {
        let table = table();
        let err = table.fetch(&query(Some("ghost:eq:1"), None)).await.unwrap_err();
        assert_eq!(err, FilterError::unknown_field("ghost"));

        let err = table
            .fetch(&query(None, Some(("ghost", SortDirection::Asc))))
            .await
            .unwrap_err();
        assert_eq!(err, FilterError::unknown_field("ghost"));
    }

    #[tokio::test]
    async fn test_strict_table_rejects_junk() {
        let table = table().with_parse_options(ParseOptions { strict: true });
        let filter = QueryFilter::Text("id:eq:1 junk".to_string());
        assert!(matches!(
            table.count(Some(&filter)).await,
            Err(FilterError::UnrecognizedInput { .. })
        ));
    }

    #[test]
    fn test_from_json_infers_schema() {
        let objects: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(r#"[{"id": 1, "joined": "2020-01-01"}, {"id": 2, "joined": null}]"#)
                .unwrap();
        let table = MemoryTable::from_json(&objects, None).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.schema().column_type("joined"), Some(ColumnType::Date));
        assert_eq!(table.rows()[1]["joined"], Value::Null);
    }
}

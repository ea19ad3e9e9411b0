//! Result assembly: projects selected source and destination columns for
//! every accepted match.

use rowmatch_model::{
    DESTINATION_PREFIX, MatchError, MatchOutcome, MatchRecord, Result, ResultRow, ResultTable,
    ResultValue, SIMILARITY_COLUMN, SOURCE_PREFIX, Tabular,
};

/// Receives assembled rows one at a time.
pub trait RecordSink {
    fn accept(&mut self, row: ResultRow);
}

impl RecordSink for ResultTable {
    fn accept(&mut self, row: ResultRow) {
        self.rows.push(row);
    }
}

impl RecordSink for Vec<ResultRow> {
    fn accept(&mut self, row: ResultRow) {
        self.push(row);
    }
}

/// A selected column: position in its dataset and output name.
#[derive(Debug, Clone)]
struct Projection {
    position: usize,
    output: String,
}

/// Builds result rows from match records.
///
/// Columns are chosen by name up front; an empty selection projects every
/// column of the dataset in its original order.
pub struct ResultAssembler<'a, S: ?Sized, D: ?Sized> {
    source: &'a S,
    destination: &'a D,
    source_columns: Vec<Projection>,
    destination_columns: Vec<Projection>,
}

impl<'a, S, D> ResultAssembler<'a, S, D>
where
    S: Tabular + ?Sized,
    D: Tabular + ?Sized,
{
    /// # Errors
    ///
    /// `ColumnNotFound` when a selected column is not in its dataset.
    pub fn new(
        source: &'a S,
        destination: &'a D,
        source_columns: &[String],
        destination_columns: &[String],
    ) -> Result<Self> {
        Ok(Self {
            source_columns: project(source, source_columns, SOURCE_PREFIX)?,
            destination_columns: project(destination, destination_columns, DESTINATION_PREFIX)?,
            source,
            destination,
        })
    }

    /// Output column names in render order; `Similarity` comes last.
    pub fn columns(&self) -> Vec<String> {
        self.source_columns
            .iter()
            .chain(&self.destination_columns)
            .map(|p| p.output.clone())
            .chain(std::iter::once(SIMILARITY_COLUMN.to_string()))
            .collect()
    }

    pub fn row(&self, record: &MatchRecord) -> ResultRow {
        let mut row = ResultRow::default();
        fill(&mut row, self.source, record.source_index, &self.source_columns);
        fill(
            &mut row,
            self.destination,
            record.target_index,
            &self.destination_columns,
        );
        row.insert(SIMILARITY_COLUMN, ResultValue::Score(record.score));
        row
    }

    /// Row for a source value without any accepted match.
    pub fn unmatched_row(&self, source_index: usize) -> ResultRow {
        let mut row = ResultRow::default();
        fill(&mut row, self.source, source_index, &self.source_columns);
        for projection in &self.destination_columns {
            row.insert(projection.output.clone(), ResultValue::Empty);
        }
        row.insert(SIMILARITY_COLUMN, ResultValue::Empty);
        row
    }

    /// Streams every row of `outcome` into `sink` in source order.
    ///
    /// Unmatched rows are placed before the records of the next source row,
    /// which assumes source values were collected in row order.
    pub fn assemble_into(&self, outcome: &MatchOutcome, sink: &mut dyn RecordSink) {
        let mut unmatched = outcome.unmatched_sources.iter().copied().peekable();
        for record in &outcome.records {
            while let Some(source_index) = unmatched.next_if(|idx| *idx < record.source_index) {
                sink.accept(self.unmatched_row(source_index));
            }
            sink.accept(self.row(record));
        }
        for source_index in unmatched {
            sink.accept(self.unmatched_row(source_index));
        }
    }

    pub fn assemble(&self, outcome: &MatchOutcome) -> ResultTable {
        let mut table = ResultTable::new(self.columns());
        self.assemble_into(outcome, &mut table);
        table
    }
}

fn project<T: Tabular + ?Sized>(
    table: &T,
    selected: &[String],
    prefix: &str,
) -> Result<Vec<Projection>> {
    if selected.is_empty() {
        return Ok(table
            .column_names()
            .iter()
            .enumerate()
            .map(|(position, name)| Projection {
                position,
                output: format!("{prefix}{name}"),
            })
            .collect());
    }
    selected
        .iter()
        .map(|name| {
            let position = table
                .column_index(name)
                .ok_or_else(|| MatchError::column_not_found(name, table.name()))?;
            Ok(Projection {
                position,
                output: format!("{prefix}{name}"),
            })
        })
        .collect()
}

fn fill<T: Tabular + ?Sized>(
    row: &mut ResultRow,
    table: &T,
    row_index: usize,
    projections: &[Projection],
) {
    for projection in projections {
        let value = match table.cell_at(row_index, projection.position) {
            Some(text) => ResultValue::Text(text.to_string()),
            None => ResultValue::Empty,
        };
        row.insert(projection.output.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use rowmatch_model::Dataset;

    use super::*;

    fn source() -> Dataset {
        Dataset::from_str_rows(
            "customers",
            &["id", "name", "city"],
            &[&["1", "Alice Smith", "Oslo"], &["2", "Bob Jones", ""]],
        )
    }

    fn destination() -> Dataset {
        Dataset::from_str_rows(
            "accounts",
            &["account", "holder"],
            &[&["A-9", "Smith, Alice"], &["B-7", "Robert Jones"]],
        )
    }

    #[test]
    fn projects_prefixed_columns_in_order() {
        let (src, dst) = (source(), destination());
        let assembler = ResultAssembler::new(
            &src,
            &dst,
            &["name".to_string(), "id".to_string()],
            &["holder".to_string()],
        )
        .unwrap();
        assert_eq!(
            assembler.columns(),
            vec![
                "Source_name",
                "Source_id",
                "Destination_holder",
                "Similarity"
            ]
        );
        let row = assembler.row(&MatchRecord {
            source_index: 0,
            target_index: 0,
            score: 95.5,
        });
        assert_eq!(
            row.get("Source_name"),
            Some(&ResultValue::Text("Alice Smith".into()))
        );
        assert_eq!(
            row.get("Destination_holder"),
            Some(&ResultValue::Text("Smith, Alice".into()))
        );
        assert_eq!(row.similarity(), Some(95.5));
        assert!(row.get("Source_city").is_none());
    }

    #[test]
    fn empty_selection_projects_all_columns() {
        let (src, dst) = (source(), destination());
        let assembler = ResultAssembler::new(&src, &dst, &[], &[]).unwrap();
        assert_eq!(assembler.columns().len(), 3 + 2 + 1);
        let row = assembler.row(&MatchRecord {
            source_index: 1,
            target_index: 1,
            score: 80.0,
        });
        assert_eq!(row.get("Source_city"), Some(&ResultValue::Empty));
    }

    #[test]
    fn unknown_projection_column_fails_before_assembly() {
        let (src, dst) = (source(), destination());
        let result = ResultAssembler::new(&src, &dst, &[], &["balance".to_string()]);
        assert_eq!(
            result.err(),
            Some(MatchError::column_not_found("balance", "accounts"))
        );
    }

    #[test]
    fn unmatched_rows_interleave_in_source_order() {
        let (src, dst) = (source(), destination());
        let assembler = ResultAssembler::new(&src, &dst, &["id".to_string()], &[]).unwrap();
        let outcome = MatchOutcome {
            records: vec![MatchRecord {
                source_index: 1,
                target_index: 1,
                score: 84.0,
            }],
            unmatched_sources: vec![0],
            ..MatchOutcome::default()
        };
        let table = assembler.assemble(&outcome);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[0].get("Source_id"),
            Some(&ResultValue::Text("1".into()))
        );
        assert_eq!(table.rows[0].get("Similarity"), Some(&ResultValue::Empty));
        assert_eq!(
            table.rows[0].get("Destination_holder"),
            Some(&ResultValue::Empty)
        );
        assert_eq!(table.rows[1].similarity(), Some(84.0));
    }

    #[test]
    fn rows_can_be_streamed_into_a_vec() {
        let (src, dst) = (source(), destination());
        let assembler = ResultAssembler::new(&src, &dst, &[], &[]).unwrap();
        let outcome = MatchOutcome {
            records: vec![MatchRecord {
                source_index: 0,
                target_index: 0,
                score: 96.0,
            }],
            ..MatchOutcome::default()
        };
        let mut rows: Vec<ResultRow> = Vec::new();
        assembler.assemble_into(&outcome, &mut rows);
        assert_eq!(rows.len(), 1);
    }
}

use crate::core::encoding::{Individual, Layout};
use anyhow::Context;
use csv::{ReaderBuilder, WriterBuilder};
use std::io::{Read, Write};

/// Read a population stored one individual per row, with no header row.
///
/// Rows may differ in length only if the district's building count does; every row must at
/// least cover the fixed part of the layout.
pub fn read_population(csv: impl Read, layout: Layout) -> anyhow::Result<Vec<Individual>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv);

    reader
        .records()
        .enumerate()
        .map(|(row, record)| {
            let record = record?;
            let slots = record
                .iter()
                .map(|value| value.parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("Could not parse individual on row {row}"))?;
            Individual::new(layout, slots)
                .with_context(|| format!("Individual on row {row} does not fit the layout"))
        })
        .collect()
}

pub fn write_population<'a>(
    writer: impl Write,
    population: impl IntoIterator<Item = &'a Individual>,
) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);
    for individual in population {
        writer.write_record(individual.as_slice().iter().map(|slot| slot.to_string()))?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    #[fixture]
    fn layout() -> Layout {
        Layout::new(2, 0, 1, 0)
    }

    #[rstest]
    fn test_read_population(layout: Layout) {
        let csv = "1,0.8,1,0.2,0,0,1,0\n0, 0, 1, 1, 1, 1, 0, 0\n";
        let population = read_population(Cursor::new(csv), layout).unwrap();

        assert_eq!(population.len(), 2);
        assert_eq!(population[0].heating(1).share, 0.2);
        assert_eq!(population[1].building_flags(), &[0., 0.]);
    }

    #[rstest]
    fn test_read_rejects_short_row(layout: Layout) {
        let csv = "1,0.8,1,0.2,0,0,1,0\n1,1,0\n";
        assert!(read_population(Cursor::new(csv), layout).is_err());
    }

    #[rstest]
    fn test_read_rejects_non_numeric_slot(layout: Layout) {
        let csv = "1,0.8,1,GHP,0,0,1,0\n";
        assert!(read_population(Cursor::new(csv), layout).is_err());
    }

    #[rstest]
    fn test_written_population_reads_back(layout: Layout) {
        let csv = "1,0.8,1,0.2,0,0,1,0\n";
        let population = read_population(Cursor::new(csv), layout).unwrap();

        let mut buffer = vec![];
        write_population(&mut buffer, &population).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), csv);
    }
}

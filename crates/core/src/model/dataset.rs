use std::collections::HashSet;

use crate::model::Record;

/// The full, ordered dataset for one session. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

/// A record together with its position in the dataset.
///
/// Scenes and hover targets keep the index rather than cloning the record.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub index: usize,
    pub record: &'a Record,
}

/// Records of one country, in the order they were selected.
#[derive(Debug, Clone)]
pub struct CountryGroup<'a> {
    pub country: &'a str,
    pub rows: Vec<Row<'a>>,
}

impl<'a> CountryGroup<'a> {
    /// The group's rows sorted by ascending year. The sort is stable, so
    /// duplicate years keep dataset order.
    pub fn in_year_order(&self) -> Vec<Row<'a>> {
        let mut rows = self.rows.clone();
        rows.sort_by_key(|row| row.record.year);
        rows
    }

    pub fn value_at(&self, year: i32) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.record.year == year)
            .map(|row| row.record.life_expectancy)
    }
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All rows, in dataset order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| Row { index, record })
    }

    /// Rows matching `keep`, in dataset order.
    pub fn select(&self, keep: impl Fn(&Record) -> bool) -> Vec<Row<'_>> {
        self.rows().filter(|row| keep(row.record)).collect()
    }

    /// Distinct country names in first-seen order.
    pub fn countries(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.country.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Life expectancy of `country` in `year`, if recorded. The first matching
    /// record wins when the dataset has duplicates.
    pub fn value_at(&self, country: &str, year: i32) -> Option<f64> {
        self.records
            .iter()
            .find(|r| r.year == year && r.country == country)
            .map(|r| r.life_expectancy)
    }

    /// Earliest and latest year present.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }
}

/// Group rows by country. Groups appear in first-seen order and each group
/// keeps its rows in the order given.
pub fn group_by_country<'a>(rows: &[Row<'a>]) -> Vec<CountryGroup<'a>> {
    let mut groups: Vec<CountryGroup<'a>> = Vec::new();
    for row in rows {
        let country = row.record.country.as_str();
        match groups.iter_mut().find(|g| g.country == country) {
            Some(group) => group.rows.push(*row),
            None => groups.push(CountryGroup {
                country,
                rows: vec![*row],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(country: &str, year: i32, value: f64) -> Record {
        Record {
            country: country.into(),
            year,
            life_expectancy: value,
        }
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            rec("Japan", 1970, 72.0),
            rec("China", 1960, 43.7),
            rec("Japan", 1960, 67.7),
            rec("China", 1970, 59.1),
            rec("France", 1960, 69.9),
        ])
    }

    #[test]
    fn countries_are_first_seen_order() {
        assert_eq!(sample().countries(), vec!["Japan", "China", "France"]);
    }

    #[test]
    fn grouping_keeps_first_seen_groups_and_dataset_order() {
        let data = sample();
        let rows = data.select(|r| r.country != "France");
        let groups = group_by_country(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].country, "Japan");
        let years: Vec<i32> = groups[0].rows.iter().map(|r| r.record.year).collect();
        assert_eq!(years, vec![1970, 1960]);

        let ordered: Vec<i32> = groups[0]
            .in_year_order()
            .iter()
            .map(|r| r.record.year)
            .collect();
        assert_eq!(ordered, vec![1960, 1970]);
    }

    #[test]
    fn lookups_miss_cleanly() {
        let data = sample();
        assert_eq!(data.value_at("China", 1970), Some(59.1));
        assert_eq!(data.value_at("China", 1990), None);
        assert_eq!(data.year_range(), Some((1960, 1970)));
        assert_eq!(Dataset::default().year_range(), None);
    }

    #[test]
    fn select_preserves_indices() {
        let data = sample();
        let rows = data.select(|r| r.year == 1960);
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 4]);
    }
}

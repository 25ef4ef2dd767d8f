use crate::core::encoding::Schema;
use crate::models::{SalaryRecord, SeriesPoint};
use std::collections::{BTreeSet, HashMap};

/// Order in which company sizes are charted
pub const COMPANY_SIZE_ORDER: [&str; 3] = ["Small", "Medium", "Large"];

/// Salaries grouped by a key, keeping first-seen key order
fn group_salaries<'a, I, F>(records: I, key: F) -> Vec<(&'a str, Vec<f64>)>
where
    I: IntoIterator<Item = &'a SalaryRecord>,
    F: Fn(&'a SalaryRecord) -> &'a str,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, Vec<f64>)> = Vec::new();

    for record in records {
        let k = key(record);
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record.salary_in_usd);
    }

    groups
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Aggregate each group, sort descending and keep the first `n`
///
/// The sort is stable, so ties keep first-seen order.
fn largest<F>(groups: Vec<(&str, Vec<f64>)>, aggregate: F, n: usize) -> Vec<SeriesPoint>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut points: Vec<(String, f64)> = groups
        .into_iter()
        .filter_map(|(label, values)| aggregate(&values).map(|v| (label.to_string(), v)))
        .collect();

    points.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    points.truncate(n);

    points
        .into_iter()
        .map(|(label, value)| SeriesPoint::new(label, value))
        .collect()
}

/// Sorted unique job titles present in the dataset
pub fn job_titles(records: &[SalaryRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.job_title.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Top `n` company locations by mean salary for one job title
pub fn top_locations_for_title(records: &[SalaryRecord], title: &str, n: usize) -> Vec<SeriesPoint> {
    let groups = group_salaries(
        records.iter().filter(|r| r.job_title == title),
        |r| r.company_location.as_str(),
    );
    largest(groups, mean, n)
}

/// Mean salary per experience level, in encoding order, unknown levels last
pub fn salary_by_experience(records: &[SalaryRecord]) -> Vec<SeriesPoint> {
    let mut groups = group_salaries(records, |r| r.experience_level.as_str());
    let known = Schema::ExperienceLevel.table();

    groups.sort_by(|(a, _), (b, _)| {
        let rank = |label: &str| known.iter().position(|k| *k == label).unwrap_or(known.len());
        rank(*a).cmp(&rank(*b)).then_with(|| a.cmp(b))
    });

    groups
        .into_iter()
        .filter_map(|(label, values)| mean(&values).map(|v| SeriesPoint::new(label, v)))
        .collect()
}

/// Mean salary per company size as Small, Medium, Large; absent sizes carry no value
pub fn salary_by_company_size(records: &[SalaryRecord]) -> Vec<SeriesPoint> {
    let groups: HashMap<&str, Vec<f64>> = group_salaries(records, |r| r.company_size.as_str())
        .into_iter()
        .collect();

    COMPANY_SIZE_ORDER
        .iter()
        .map(|size| match groups.get(size).and_then(|values| mean(values)) {
            Some(value) => SeriesPoint::new(*size, value),
            None => SeriesPoint::empty(*size),
        })
        .collect()
}

/// Top `n` company locations by mean salary
pub fn top_locations(records: &[SalaryRecord], n: usize) -> Vec<SeriesPoint> {
    largest(group_salaries(records, |r| r.company_location.as_str()), mean, n)
}

/// Top `n` job titles by median salary
pub fn top_job_titles_by_median(records: &[SalaryRecord], n: usize) -> Vec<SeriesPoint> {
    largest(group_salaries(records, |r| r.job_title.as_str()), median, n)
}

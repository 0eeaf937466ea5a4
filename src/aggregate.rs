//! Screen-count estimation and the four-bucket aggregation that feeds the
//! BOR sheets.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::rows::{AggregateRow, NormalizedTicketRow};

/// A screen needs this many distinct show-times before it counts as an
/// active screen for the engagement.
const ACTIVE_SCREEN_TIMES: usize = 3;

/// Destination bucket of one normalized row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bucket {
    Daily,
    DailySummary,
    Weekly,
    WeeklySummary,
}

impl Bucket {
    pub fn of(row: &NormalizedTicketRow) -> Bucket {
        match (row.raw.week_type == "weekly", row.raw.is_summary) {
            (false, false) => Bucket::Daily,
            (false, true) => Bucket::DailySummary,
            (true, false) => Bucket::Weekly,
            (true, true) => Bucket::WeeklySummary,
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        match self {
            Bucket::Daily => "Daily BOR",
            Bucket::DailySummary => "Daily BOR - Summary",
            Bucket::Weekly => "Weekly BOR",
            Bucket::WeeklySummary => "Weekly BOR - Summary",
        }
    }
}

/// All four aggregate tables for one document, bucket order fixed.
#[derive(Debug, Default)]
pub struct AggregateTables {
    pub daily: Vec<AggregateRow>,
    pub daily_summary: Vec<AggregateRow>,
    pub weekly: Vec<AggregateRow>,
    pub weekly_summary: Vec<AggregateRow>,
}

impl AggregateTables {
    pub fn buckets(&self) -> [(Bucket, &Vec<AggregateRow>); 4] {
        [
            (Bucket::Daily, &self.daily),
            (Bucket::DailySummary, &self.daily_summary),
            (Bucket::Weekly, &self.weekly),
            (Bucket::WeeklySummary, &self.weekly_summary),
        ]
    }
}

fn engagement_key(row: &NormalizedTicketRow) -> (String, String, String, String, String, String, String, String, bool, String, String) {
    let r = &row.raw;
    (
        r.source_file.clone(),
        r.exhibitor.clone(),
        r.cinema.clone(),
        r.week_type.clone(),
        r.extracted_at.clone(),
        r.movie_title.clone(),
        row.movie_title_mapped.clone(),
        r.show_date.clone(),
        r.is_summary,
        row.country.clone(),
        r.format_code.clone(),
    )
}

/// Stamp `screen_calc` on every row: per engagement group, the number of
/// screens with at least three distinct show-times, floored at 1. Rows
/// missing either screen or time do not contribute.
pub fn estimate_screens(rows: &mut [NormalizedTicketRow]) {
    let mut times_per_screen: HashMap<_, HashMap<String, HashSet<String>>> = HashMap::new();
    for row in rows.iter() {
        let (Some(screen), Some(time)) = (&row.raw.screen, &row.raw.show_time) else {
            continue;
        };
        times_per_screen
            .entry(engagement_key(row))
            .or_default()
            .entry(screen.clone())
            .or_default()
            .insert(time.clone());
    }

    let counts: HashMap<_, u32> = times_per_screen
        .into_iter()
        .map(|(key, screens)| {
            let active = screens
                .values()
                .filter(|times| times.len() >= ACTIVE_SCREEN_TIMES)
                .count() as u32;
            (key, active.max(1))
        })
        .collect();

    for row in rows.iter_mut() {
        row.screen_calc = counts.get(&engagement_key(row)).copied().unwrap_or(1);
    }
}

/// Partition into the four buckets and compute the grouped sums. Group
/// order follows first appearance in the input.
pub fn aggregate(rows: &[NormalizedTicketRow]) -> AggregateTables {
    let mut tables = AggregateTables::default();
    for bucket in [Bucket::Daily, Bucket::DailySummary, Bucket::Weekly, Bucket::WeeklySummary] {
        let selected: Vec<&NormalizedTicketRow> =
            rows.iter().filter(|r| Bucket::of(r) == bucket).collect();
        let grouped = group(&selected);
        match bucket {
            Bucket::Daily => tables.daily = grouped,
            Bucket::DailySummary => tables.daily_summary = grouped,
            Bucket::Weekly => tables.weekly = grouped,
            Bucket::WeeklySummary => tables.weekly_summary = grouped,
        }
    }
    tables
}

fn group(rows: &[&NormalizedTicketRow]) -> Vec<AggregateRow> {
    let mut order: Vec<AggregateRow> = Vec::new();
    let mut index: HashMap<(String, String, String, String, String, String, String, String, String), usize> =
        HashMap::new();
    let mut times: Vec<HashSet<String>> = Vec::new();

    for row in rows {
        let r = &row.raw;
        let key = (
            row.country.clone(),
            r.source_file.clone(),
            r.exhibitor.clone(),
            r.cinema.clone(),
            r.extracted_at.clone(),
            r.movie_title.clone(),
            row.movie_title_mapped.clone(),
            r.show_date.clone(),
            r.format_code.clone(),
        );
        let idx = *index.entry(key).or_insert_with(|| {
            order.push(AggregateRow {
                country: row.country.clone(),
                source_file: r.source_file.clone(),
                exhibitor: r.exhibitor.clone(),
                cinema: r.cinema.clone(),
                extracted_at: r.extracted_at.clone(),
                movie_title: r.movie_title.clone(),
                movie_title_mapped: row.movie_title_mapped.clone(),
                show_date: r.show_date.clone(),
                format_code: r.format_code.clone(),
                admits: 0.0,
                gross: 0.0,
                net: 0.0,
                comp: 0.0,
                summary_sessions: 0.0,
                screen_calc: 0,
                session_count: 0,
                composite_key: row.composite_key.clone(),
            });
            times.push(HashSet::new());
            order.len() - 1
        });

        let agg = &mut order[idx];
        agg.admits += r.admits;
        agg.gross += r.gross;
        agg.net += r.net;
        agg.comp += r.comp.unwrap_or(0.0);
        agg.summary_sessions += r.summary_sessions.unwrap_or(0.0);
        agg.screen_calc = agg.screen_calc.max(row.screen_calc);
        if let Some(t) = &r.show_time {
            times[idx].insert(t.clone());
        }
    }

    for (idx, agg) in order.iter_mut().enumerate() {
        agg.session_count = times[idx].len();
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::RawTicketRow;

    fn norm(movie: &str, time: Option<&str>, screen: Option<&str>, admits: f64, weekly: bool, summary: bool) -> NormalizedTicketRow {
        let mut raw = RawTicketRow::new("f.txt", "Galaxy", "Galaxy Mall", if weekly { "weekly" } else { "" }, "ts");
        raw.movie_title = movie.to_string();
        raw.show_date = "16/09/2025".to_string();
        raw.show_time = time.map(|t| t.to_string());
        raw.screen = screen.map(|s| s.to_string());
        raw.admits = admits;
        raw.gross = admits * 10.0;
        raw.net = admits * 9.0;
        raw.comp = Some(1.0);
        raw.is_summary = summary;
        NormalizedTicketRow {
            raw,
            movie_title_mapped: movie.to_string(),
            country: "Kuwait".to_string(),
            screen_calc: 1,
            composite_key: "k".to_string(),
        }
    }

    #[test]
    fn screens_below_threshold_floor_at_one() {
        let mut rows = vec![
            norm("A", Some("10:00"), Some("S1"), 1.0, false, false),
            norm("A", Some("12:00"), Some("S1"), 1.0, false, false),
            norm("A", Some("10:00"), Some("S2"), 1.0, false, false),
        ];
        estimate_screens(&mut rows);
        assert!(rows.iter().all(|r| r.screen_calc == 1));
    }

    #[test]
    fn screens_reaching_three_times_count() {
        let mut rows = Vec::new();
        for t in ["10:00", "12:00", "14:00"] {
            rows.push(norm("A", Some(t), Some("S1"), 1.0, false, false));
        }
        for t in ["10:00", "12:00", "14:00", "16:00"] {
            rows.push(norm("A", Some(t), Some("S2"), 1.0, false, false));
        }
        rows.push(norm("A", Some("18:00"), Some("S3"), 1.0, false, false));
        estimate_screens(&mut rows);
        assert!(rows.iter().all(|r| r.screen_calc == 2));
    }

    #[test]
    fn buckets_are_disjoint_and_complete() {
        let rows = vec![
            norm("A", Some("10:00"), None, 1.0, false, false),
            norm("A", None, None, 2.0, false, true),
            norm("A", Some("10:00"), None, 3.0, true, false),
            norm("A", None, None, 4.0, true, true),
        ];
        let t = aggregate(&rows);
        assert_eq!(t.daily.len(), 1);
        assert_eq!(t.daily_summary.len(), 1);
        assert_eq!(t.weekly.len(), 1);
        assert_eq!(t.weekly_summary.len(), 1);
        assert_eq!(t.daily[0].admits, 1.0);
        assert_eq!(t.weekly_summary[0].admits, 4.0);
    }

    #[test]
    fn sums_round_trip_against_raw_rows() {
        let rows = vec![
            norm("A", Some("10:00"), Some("S1"), 5.0, false, false),
            norm("A", Some("12:00"), Some("S1"), 7.0, false, false),
            norm("B", Some("10:00"), Some("S1"), 11.0, false, false),
        ];
        let t = aggregate(&rows);
        let agg_admits: f64 = t.daily.iter().map(|a| a.admits).sum();
        let raw_admits: f64 = rows.iter().map(|r| r.raw.admits).sum();
        assert_eq!(agg_admits, raw_admits);
        let agg_gross: f64 = t.daily.iter().map(|a| a.gross).sum();
        assert_eq!(agg_gross, raw_admits * 10.0);
        let a = t.daily.iter().find(|a| a.movie_title == "A").unwrap();
        assert_eq!(a.admits, 12.0);
        assert_eq!(a.comp, 2.0);
        assert_eq!(a.session_count, 2);
    }
}

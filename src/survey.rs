//! Survey data model and the three per-chart projections
//!
//! Rows keep their raw cell text; each derived view applies its own presence
//! rules, so a row missing one field only drops out of the views needing it.

use serde::Serialize;
use std::collections::HashMap;

/// Zero-based position of a row in the source CSV
pub type RowId = usize;

/// Header names, matched verbatim
pub mod columns {
    pub const FAV_GENRE: &str = "Fav genre";
    pub const HOURS_PER_DAY: &str = "Hours per day";
    pub const ANXIETY: &str = "Anxiety";
    pub const DEPRESSION: &str = "Depression";
    pub const INSOMNIA: &str = "Insomnia";
    pub const OCD: &str = "OCD";
    pub const AGE: &str = "Age";
    pub const STREAMING_SERVICE: &str = "Primary streaming service";
}

/// Genre label used when a row has no favorite-genre field at all
pub const UNKNOWN_GENRE: &str = "Unknown";

/// One respondent, cells as read from the CSV (`None` = column absent)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyRow {
    pub id: RowId,
    pub fav_genre: Option<String>,
    pub hours_per_day: Option<String>,
    pub anxiety: Option<String>,
    pub depression: Option<String>,
    pub insomnia: Option<String>,
    pub ocd: Option<String>,
    pub age: Option<String>,
    pub streaming_service: Option<String>,
}

impl SurveyRow {
    /// Build a row from a header -> cell lookup
    pub fn from_record(id: RowId, record: &HashMap<&str, &str>) -> Self {
        let cell = |name: &str| record.get(name).map(|v| v.to_string());
        Self {
            id,
            fav_genre: cell(columns::FAV_GENRE),
            hours_per_day: cell(columns::HOURS_PER_DAY),
            anxiety: cell(columns::ANXIETY),
            depression: cell(columns::DEPRESSION),
            insomnia: cell(columns::INSOMNIA),
            ocd: cell(columns::OCD),
            age: cell(columns::AGE),
            streaming_service: cell(columns::STREAMING_SERVICE),
        }
    }
}

/// Genre name with its respondent count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// (hours, anxiety) pair for the scatter plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub id: RowId,
    pub hours: f64,
    pub anxiety: f64,
}

/// One axis of the parallel coordinates plot, in drawing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Dimension {
    Age,
    Hours,
    Anxiety,
    Depression,
    Insomnia,
    Ocd,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Age,
        Dimension::Hours,
        Dimension::Anxiety,
        Dimension::Depression,
        Dimension::Insomnia,
        Dimension::Ocd,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Age => "Age",
            Dimension::Hours => "Hours",
            Dimension::Anxiety => "Anxiety",
            Dimension::Depression => "Depression",
            Dimension::Insomnia => "Insomnia",
            Dimension::Ocd => "OCD",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Six numeric dimensions plus the streaming-service category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParallelTuple {
    pub id: RowId,
    pub values: [f64; 6],
    pub category: String,
}

impl ParallelTuple {
    pub fn value(&self, dim: Dimension) -> f64 {
        self.values[dim.index()]
    }
}

/// The three derived views, recomputed in full on every load
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    pub genres: Vec<GenreCount>,
    pub scatter: Vec<ScatterPoint>,
    pub parallel: Vec<ParallelTuple>,
}

impl Dataset {
    pub fn from_rows(rows: &[SurveyRow]) -> Self {
        Self {
            genres: genre_counts(rows),
            scatter: scatter_points(rows),
            parallel: parallel_tuples(rows),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.scatter.is_empty() && self.parallel.is_empty()
    }
}

/// A cell counts as present when it exists and is non-empty
fn present(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().filter(|s| !s.is_empty())
}

/// Unary-plus style coercion: blank is zero, unparsable is NaN
pub fn coerce_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}

/// Count rows per trimmed favorite genre, descending by count.
/// Ties keep the order in which genres first appear.
pub fn genre_counts(rows: &[SurveyRow]) -> Vec<GenreCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<GenreCount> = Vec::new();

    for row in rows {
        let genre = row
            .fav_genre
            .as_deref()
            .map(str::trim)
            .unwrap_or(UNKNOWN_GENRE)
            .to_string();
        match index.get(&genre) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(genre.clone(), counts.len());
                counts.push(GenreCount { genre, count: 1 });
            }
        }
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Rows with both hours-per-day and anxiety present
pub fn scatter_points(rows: &[SurveyRow]) -> Vec<ScatterPoint> {
    rows.iter()
        .filter_map(|row| {
            let hours = present(&row.hours_per_day)?;
            let anxiety = present(&row.anxiety)?;
            Some(ScatterPoint {
                id: row.id,
                hours: coerce_number(hours),
                anxiety: coerce_number(anxiety),
            })
        })
        .collect()
}

/// Rows with all six numeric fields and the streaming service present
pub fn parallel_tuples(rows: &[SurveyRow]) -> Vec<ParallelTuple> {
    rows.iter()
        .filter_map(|row| {
            let age = present(&row.age)?;
            let hours = present(&row.hours_per_day)?;
            let anxiety = present(&row.anxiety)?;
            let depression = present(&row.depression)?;
            let insomnia = present(&row.insomnia)?;
            let ocd = present(&row.ocd)?;
            let category = present(&row.streaming_service)?;
            Some(ParallelTuple {
                id: row.id,
                values: [
                    coerce_number(age),
                    coerce_number(hours),
                    coerce_number(anxiety),
                    coerce_number(depression),
                    coerce_number(insomnia),
                    coerce_number(ocd),
                ],
                category: category.to_string(),
            })
        })
        .collect()
}

/// Distinct categories in first-seen order
pub fn categories(tuples: &[ParallelTuple]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for t in tuples {
        if !seen.iter().any(|c| c == &t.category) {
            seen.push(t.category.clone());
        }
    }
    seen
}

pub mod analytics;
pub mod evaluation;
pub mod project;
pub mod rubric;
pub mod sale;

use std::str::FromStr;

use strum::IntoEnumIterator;

use crate::domain::sheets::schema::{clients, projects, sales};

/// Every worksheet the services read or write, main sheet first.
pub fn worksheets() -> Vec<&'static str> {
    let mut worksheets = vec![clients::WORKSHEET];
    worksheets.extend(rubric::EvaluationCategory::iter().map(|c| c.worksheet()));
    worksheets.extend([projects::WORKSHEET, sales::WORKSHEET]);
    worksheets
}

/// True when nothing is wanted or `cell` parses to the wanted value, so sheet
/// text and any alias of it compare equal.
pub(crate) fn cell_is<T: FromStr + PartialEq>(wanted: Option<&T>, cell: &str) -> bool {
    wanted.map_or(true, |w| cell.trim().parse::<T>().is_ok_and(|v| v == *w))
}

/// Raw cell text of a worksheet, row by row. Rows may be ragged: the remote
/// service drops trailing blank cells.
pub type Grid = Vec<Vec<String>>;

/// A worksheet resolved inside the spreadsheet document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetHandle {
    pub title: String,
    pub sheet_id: i32,
}

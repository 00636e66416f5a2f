pub mod a1_notation;
pub mod cell_value;
pub mod column;
pub mod header;
pub mod record;
pub mod row_location;
pub mod schema;
pub mod worksheet;

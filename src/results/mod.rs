mod row;

pub use row::{Columns, Row};

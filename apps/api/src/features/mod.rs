// Pair feature engineering: schema, similarity lookups, match features.

pub mod engineer;
pub mod schema;
pub mod similarity;

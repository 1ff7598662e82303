pub mod convert;
pub mod similarity;

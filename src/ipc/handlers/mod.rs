pub mod answers;
pub mod core;
pub mod homework;
pub mod matching;
pub mod review;

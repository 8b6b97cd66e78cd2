// Topic change detection — keyword extraction, term-frequency vectors,
// cosine overlap, and the threshold decision on top.

pub mod detector;
pub mod keywords;
pub mod overlap;
pub mod vector;

// topicshift: topic change detection for conversations.
//
// This is the library root. The analyzer module wraps the external
// morphological analyzer; topics holds the keyword/vector/similarity core;
// pipeline and output serve the command-line front end.

pub mod analyzer;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod topics;

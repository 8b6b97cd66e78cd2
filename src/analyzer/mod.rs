// Morphological analysis — trait-based abstraction over the external analyzer.
//
// The Analyzer trait defines the interface. CabochaAnalyzer shells out to the
// `cabocha` binary and parses its lattice output. LexiconAnalyzer is an
// in-process stand-in driven by a fixed word list, for tests and offline runs.

pub mod cabocha;
pub mod lexicon;
pub mod traits;

// Drivers that run the detector over more than one utterance.

pub mod replay;

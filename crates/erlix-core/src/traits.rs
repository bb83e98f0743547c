use crate::{ErlixError, Location, UnitFacts};

/// Front-end parser boundary: turns raw source bytes into the extracted
/// facts of one unit. The indexer treats implementations as opaque and
/// trusted; parse failures must come back as [`ErlixError::Parse`] so the
/// indexing pipeline can attribute them to the offending location.
pub trait UnitParser: Send + Sync {
    fn parse(&self, location: &Location, source: &[u8]) -> Result<UnitFacts, ErlixError>;
}

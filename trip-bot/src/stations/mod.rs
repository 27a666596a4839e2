//! Station directory.
//!
//! Lookup and search over a fixed catalog of provider station codes and
//! display names, plus normalisation of what users type by hand.

mod catalog;
mod directory;

pub use directory::{DEFAULT_SEARCH_LIMIT, StationDirectory, UnknownStation};

pub use crate::{
    catalog::{Catalog, SatelliteName},
    lla::Lla,
    mode::{TrackerMode, TrackerModeError},
    record::SatelliteRecord,
};

//! Airport index: reference table and nearest-airport lookup.
//!
//! Lookup is a linear scan. The built-in table holds a few dozen fields,
//! and the detector queries once per track point, so O(points × airports)
//! is fine; a spatial index would be needed for tables in the thousands.

use crate::geo::distance_meters;
use crate::types::{Airport, GeoPoint, LogbookError, Result};

// ---------------------------------------------------------------------------
// Built-in reference table
// ---------------------------------------------------------------------------

/// Alabama airports and coastal stations: (id, state, site, lat, lon, elevation ft).
const BUILTIN_AIRPORTS: &[(&str, &str, &str, f64, f64, f64)] = &[
    ("CRTA1", "AL", "Cedar Point", 30.308, -88.14, 20.0),
    ("DPIA1", "AL", "Dauphin Island", 30.248, -88.073, 0.0),
    ("FMOA1", "AL", "Fort Morgan", 30.228, -88.025, 0.0),
    ("K0J4", "AL", "Florala Muni", 31.0447, -86.3119, 315.0),
    ("K0J6", "AL", "Headland Muni", 31.3651, -85.3112, 358.0),
    ("K11A", "AL", "Clayton Muni", 31.8815, -85.4804, 433.0),
    ("K1A9", "AL", "Prattville Arpt", 32.4374, -86.5098, 213.0),
    ("K1M4", "AL", "Haleyville/Posey Fld", 34.2832, -87.5986, 928.0),
    ("K1R8", "AL", "Bay Minette Muni", 30.8691, -87.8184, 249.0),
    ("K3A1", "AL", "Cullman/Folsom Fld", 34.268, -86.858, 965.0),
    ("K4A6", "AL", "Scottsboro Muni", 34.688, -86.006, 627.0),
    ("K4A9", "AL", "Fort Payne/Isbell Fld", 34.4759, -85.717, 896.0),
    ("K79J", "AL", "Andalusia/Benton Fld", 31.3061, -86.3902, 305.0),
    ("K8A0", "AL", "Albertville Muni", 34.2316, -86.2481, 1027.0),
    ("K9A4", "AL", "Courtland(AAF)", 34.66, -87.349, 577.0),
    ("KA08", "AL", "Marion/Vaiden Fld", 32.5167, -87.3853, 210.0),
    ("KAIV", "AL", "Aliceville/Downer Arpt", 33.108, -88.192, 151.0),
    ("KALX", "AL", "Alexander City/Russell Fld", 32.916, -85.964, 650.0),
    ("KANB", "AL", "Anniston Metro", 33.5904, -85.8479, 614.0),
    ("KASN", "AL", "Talladega Muni", 33.569, -86.0519, 522.0),
    ("KATA1", "AL", "Katrina Cut", 30.258, -88.213, 13.0),
    ("KAUO", "AL", "Auburn Univ Arpt", 32.617, -85.4342, 758.0),
    ("KBFM", "AL", "Mobile/Downtown Arpt", 30.6147, -88.063, 23.0),
    ("KBHM", "AL", "Birmingham Intl", 33.5655, -86.7449, 627.0),
    ("KCKL", "AL", "Centreville/Bib", 32.9, -87.25, 459.0),
    ("KCMD", "AL", "Culman Rgnl", 34.2722, -86.8583, 965.0),
    ("KCQF", "AL", "Fairhope/Callahan Arpt", 30.4618, -87.8749, 69.0),
    ("KDCU", "AL", "Decatur/Pryor Fld", 34.658, -86.9434, 591.0),
    ("KDHN", "AL", "Dothan Rgnl", 31.3177, -85.4432, 371.0),
    ("KDYA", "AL", "Demopolis Muni", 32.4641, -87.9504, 108.0),
    ("KEDN", "AL", "Enterprise Muni", 31.299, -85.9, 338.0),
    ("KEET", "AL", "Alabaster/Shelby Cnty", 33.1783, -86.7818, 564.0),
    ("KEKY", "AL", "Bessemer Arpt", 33.314, -86.925, 699.0),
    ("KEUF", "AL", "Eufaula/Weedon Fld", 31.9516, -85.1312, 285.0),
    ("KGAD", "AL", "Gadsden/NE Alabama Rgnl", 33.9686, -86.0917, 554.0),
    ("KGZH", "AL", "Evergreen/Middleton Fld", 31.4191, -87.0484, 253.0),
    ("KHAB", "AL", "Hamilton/Marion Cnty", 34.117, -87.998, 413.0),
    ("KHDL", "AL", "Headland Muni", 31.3641, -85.3112, 358.0),
    ("KHEY", "AL", "Hanchey(AHP)", 31.348, -85.655, 312.0),
    ("KHSV", "AL", "Huntsville Intl", 34.6441, -86.7861, 623.0),
    ("KHUA", "AL", "Huntsville/Redstone AAF", 34.676, -86.6854, 656.0),
    ("KJFX", "AL", "Jasper/Walker Cnty", 33.9008, -87.3092, 472.0),
    ("KJKA", "AL", "Gulf Shores/Edwards Arpt", 30.291, -87.661, 16.0),
    ("KLOR", "AL", "Ft Rucker/Lowe(AHP)", 31.36, -85.749, 302.0),
    ("KMDQ", "AL", "Huntsville/Sharp Fld", 34.866, -86.559, 725.0),
    ("KMGM", "AL", "Montgomery Rgnl", 32.2997, -86.4074, 210.0),
    ("KMOB", "AL", "Mobile Rgnl", 30.6882, -88.2459, 220.0),
    ("KMSL", "AL", "Muscle Shoals/NW Alabama Rgnl", 34.7439, -87.5997, 558.0),
    ("KMVC", "AL", "Monroeville/Monroe Cnty", 31.458, -87.351, 420.0),
    ("KMXF", "AL", "Maxwell AFB", 32.3877, -86.3724, 154.0),
    ("KNBJ", "AL", "Barin Fld(NAS)", 30.391, -87.633, 49.0),
    ("KOZR", "AL", "Ozark/Cairns AAF", 31.2767, -85.7105, 295.0),
    ("KPLR", "AL", "Pell City/St Clair Cnty", 33.5608, -86.2463, 476.0),
    ("KPRN", "AL", "Greenville/Crenshaw Mem", 31.8467, -86.6141, 449.0),
    ("KSCD", "AL", "Sylacauga Muni", 33.1732, -86.2933, 538.0),
    ("KSEM", "AL", "Selma/Craig Fld", 32.3367, -86.9836, 157.0),
    ("KSXS", "AL", "Schell AFP", 31.364, -85.846, 394.0),
    ("KTCL", "AL", "Tuscaloosa Rgnl", 33.2122, -87.6155, 157.0),
    ("KTOI", "AL", "Troy Muni", 31.8574, -86.0103, 394.0),
    ("KVOA", "AL", "Viosca Knoll 786A", 29.2289, -87.7808, 174.0),
    ("MBLA1", "AL", "Middle Bay Light", 30.437, -88.012, 62.0),
    ("MCGA1", "AL", "Mobile/Coast Guard S", 30.648, -88.058, 52.0),
    ("MHPA1", "AL", "Meaher Park", 30.667, -87.936, 33.0),
    ("OBLA1", "AL", "Mobile State Docks", 30.708, -88.043, 0.0),
    ("PPTA1", "AL", "Perdido Pass", 30.279, -87.556, 16.0),
    ("UNLA2", "AL", "Unalaska", 53.879, -166.54, 7.0),
    ("WBYA1", "AL", "Weeks Bay", 30.417, -87.825, 0.0),
    ("WKXA1", "AL", "Weeks Bay Reserve", 30.421, -87.829, 33.0),
];

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Read-only airport table, kept in load order.
///
/// Never mutated after construction, so one index can be shared by
/// reference across concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct AirportIndex {
    airports: Vec<Airport>,
}

impl AirportIndex {
    pub fn new(airports: Vec<Airport>) -> Self {
        AirportIndex { airports }
    }

    /// The built-in Alabama table.
    pub fn builtin() -> Self {
        let airports = BUILTIN_AIRPORTS
            .iter()
            .map(|&(id, state, site, lat, lon, elevation_ft)| Airport {
                id: id.to_string(),
                state: state.to_string(),
                site: site.to_string(),
                lat,
                lon,
                elevation_ft,
            })
            .collect();
        AirportIndex { airports }
    }

    /// Nearest airport to `point` and its distance in meters.
    ///
    /// Ties go to the airport listed first. `None` only for an empty table.
    /// Linear scan per call: fine for a regional table of tens of airports,
    /// but a national table would want a spatial index.
    pub fn nearest(&self, point: GeoPoint) -> Option<(&Airport, f64)> {
        let mut best: Option<(&Airport, f64)> = None;
        for airport in &self.airports {
            let dist = distance_meters(point, airport.position());
            match best {
                Some((_, d)) if dist >= d => {}
                _ => best = Some((airport, dist)),
            }
        }
        best
    }

    /// Look up an airport by id, case-insensitive.
    pub fn get(&self, id: &str) -> Option<&Airport> {
        self.airports
            .iter()
            .find(|a| a.id.eq_ignore_ascii_case(id.trim()))
    }

    /// Like `get`, but an absent id is an `UnknownAirport` error.
    pub fn require(&self, id: &str) -> Result<&Airport> {
        self.get(id)
            .ok_or_else(|| LogbookError::UnknownAirport(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Airport> {
        self.airports.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(id: &str, lat: f64, lon: f64) -> Airport {
        Airport {
            id: id.to_string(),
            state: "AL".to_string(),
            site: id.to_string(),
            lat,
            lon,
            elevation_ft: 0.0,
        }
    }

    #[test]
    fn test_builtin_table() {
        let index = AirportIndex::builtin();
        assert_eq!(index.len(), 68);
        let sem = index.get("KSEM").unwrap();
        assert_eq!(sem.site, "Selma/Craig Fld");
        assert_eq!(sem.elevation_ft, 157.0);
    }

    #[test]
    fn test_get_case_insensitive() {
        let index = AirportIndex::builtin();
        assert!(index.get("keet").is_some());
        assert!(index.get(" KEET ").is_some());
        assert!(index.get("KXYZ").is_none());
    }

    #[test]
    fn test_require_unknown() {
        let index = AirportIndex::builtin();
        assert!(index.require("KBHM").is_ok());
        match index.require("KXYZ") {
            Err(LogbookError::UnknownAirport(id)) => assert_eq!(id, "KXYZ"),
            other => panic!("expected UnknownAirport, got {other:?}"),
        }
    }

    #[test]
    fn test_nearest_builtin() {
        let index = AirportIndex::builtin();
        // Just off the Selma runway
        let (apt, dist) = index.nearest(GeoPoint::new(32.34, -86.98)).unwrap();
        assert_eq!(apt.id, "KSEM");
        assert!(dist < 1000.0, "got {dist}");
    }

    #[test]
    fn test_nearest_tie_goes_to_first() {
        let index = AirportIndex::new(vec![
            airport("AAAA", 10.0, 10.0),
            airport("BBBB", 10.0, 10.0),
        ]);
        let (apt, dist) = index.nearest(GeoPoint::new(10.0, 10.0)).unwrap();
        assert_eq!(apt.id, "AAAA");
        assert_eq!(dist, 0.0);
    }

    #[test]
    fn test_nearest_empty() {
        let index = AirportIndex::default();
        assert!(index.is_empty());
        assert!(index.nearest(GeoPoint::new(0.0, 0.0)).is_none());
    }
}

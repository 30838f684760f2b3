//! Static dictionaries for the categorical columns.
//!
//! Every categorical column is stored on disk as a small `i8` code. The
//! encodings are baked in and stable across runs: changing an ordering here
//! would silently invalidate any comparison against previously produced
//! artifacts, so the tables must stay exactly as-is.
//!
//! The month and lease-commence dictionaries are arithmetic (contiguous
//! ranges), the rest are lookup tables with a lazily built reverse map.
//!
//! Round-trip law, relied on by the splitter and the tests:
//! `decode(encode(x)) == x` for every in-domain `x`.

use std::collections::HashMap;
use std::sync::LazyLock;

/* ===================== month ===================== */

const MONTH_BASE_YEAR: i32 = 2014;
/// Codes cover 2014-01 ..= 2024-01 inclusive.
pub const MONTH_CODES: i8 = 121;

/// Encode a `YYYY-MM` month into its dictionary code (`0..=120`).
pub fn month_code(month: &str) -> Option<i8> {
    let (y, m) = month.split_once('-')?;
    if y.len() != 4 || m.len() != 2 {
        return None;
    }
    let year: i32 = y.parse().ok()?;
    let mon: i32 = m.parse().ok()?;
    if !(1..=12).contains(&mon) {
        return None;
    }
    let code = (year - MONTH_BASE_YEAR) * 12 + (mon - 1);
    if (0..MONTH_CODES as i32).contains(&code) {
        Some(code as i8)
    } else {
        None
    }
}

/// Decode a month code back into `YYYY-MM`.
pub fn month_name(code: i8) -> Option<String> {
    if !(0..MONTH_CODES).contains(&code) {
        return None;
    }
    let year = MONTH_BASE_YEAR + code as i32 / 12;
    let mon = code as i32 % 12 + 1;
    Some(format!("{year}-{mon:02}"))
}

/* ===================== town ===================== */

pub const TOWNS: [&str; 26] = [
    "BEDOK",
    "BUKIT PANJANG",
    "CLEMENTI",
    "CHOA CHU KANG",
    "HOUGANG",
    "JURONG WEST",
    "PASIR RIS",
    "TAMPINES",
    "WOODLANDS",
    "YISHUN",
    "ANG MO KIO",
    "BISHAN",
    "BUKIT BATOK",
    "BUKIT MERAH",
    "BUKIT TIMAH",
    "CENTRAL AREA",
    "GEYLANG",
    "JURONG EAST",
    "KALLANG/WHAMPOA",
    "MARINE PARADE",
    "PUNGGOL",
    "QUEENSTOWN",
    "SEMBAWANG",
    "SENGKANG",
    "SERANGOON",
    "TOA PAYOH",
];

static TOWN_CODES: LazyLock<HashMap<&'static str, i8>> = LazyLock::new(|| reverse(&TOWNS));

pub fn town_code(town: &str) -> Option<i8> {
    TOWN_CODES.get(town).copied()
}

pub fn town_name(code: i8) -> Option<&'static str> {
    TOWNS.get(usize::try_from(code).ok()?).copied()
}

/* ===================== flat_type ===================== */

pub const FLAT_TYPES: [&str; 7] = [
    "1 ROOM",
    "2 ROOM",
    "3 ROOM",
    "4 ROOM",
    "5 ROOM",
    "MULTI-GENERATION",
    "EXECUTIVE",
];

static FLAT_TYPE_CODES: LazyLock<HashMap<&'static str, i8>> = LazyLock::new(|| reverse(&FLAT_TYPES));

pub fn flat_type_code(flat_type: &str) -> Option<i8> {
    FLAT_TYPE_CODES.get(flat_type).copied()
}

pub fn flat_type_name(code: i8) -> Option<&'static str> {
    FLAT_TYPES.get(usize::try_from(code).ok()?).copied()
}

/* ===================== storey_range ===================== */

/// 3-floor bands, "01 TO 03" through "49 TO 51".
pub const STOREY_RANGES: [&str; 17] = [
    "01 TO 03",
    "04 TO 06",
    "07 TO 09",
    "10 TO 12",
    "13 TO 15",
    "16 TO 18",
    "19 TO 21",
    "22 TO 24",
    "25 TO 27",
    "28 TO 30",
    "31 TO 33",
    "34 TO 36",
    "37 TO 39",
    "40 TO 42",
    "43 TO 45",
    "46 TO 48",
    "49 TO 51",
];

static STOREY_RANGE_CODES: LazyLock<HashMap<&'static str, i8>> =
    LazyLock::new(|| reverse(&STOREY_RANGES));

pub fn storey_range_code(storey_range: &str) -> Option<i8> {
    STOREY_RANGE_CODES.get(storey_range).copied()
}

pub fn storey_range_name(code: i8) -> Option<&'static str> {
    STOREY_RANGES.get(usize::try_from(code).ok()?).copied()
}

/* ===================== flat_model ===================== */

pub const FLAT_MODELS: [&str; 21] = [
    "Improved",
    "New Generation",
    "Model A",
    "Simplified",
    "Premium Apartment",
    "Standard",
    "Model A-Maisonette",
    "Apartment",
    "Maisonette",
    "Model A2",
    "Terrace",
    "Adjoined flat",
    "DBSS",
    "Multi Generation",
    "Premium Maisonette",
    "Improved-Maisonette",
    "Type S1",
    "Type S2",
    "Premium Apartment Loft",
    "2-room",
    "3Gen",
];

static FLAT_MODEL_CODES: LazyLock<HashMap<&'static str, i8>> =
    LazyLock::new(|| reverse(&FLAT_MODELS));

pub fn flat_model_code(flat_model: &str) -> Option<i8> {
    FLAT_MODEL_CODES.get(flat_model).copied()
}

pub fn flat_model_name(code: i8) -> Option<&'static str> {
    FLAT_MODELS.get(usize::try_from(code).ok()?).copied()
}

/* ===================== lease_commence_date ===================== */

const LEASE_BASE_YEAR: i32 = 1966;
const LEASE_LAST_YEAR: i32 = 2022;

/// Encode a lease commence year (`"1966"..="2022"`) into `0..=56`.
pub fn lease_commence_code(year: &str) -> Option<i8> {
    let y: i32 = year.parse().ok()?;
    if (LEASE_BASE_YEAR..=LEASE_LAST_YEAR).contains(&y) {
        Some((y - LEASE_BASE_YEAR) as i8)
    } else {
        None
    }
}

pub fn lease_commence_name(code: i8) -> Option<String> {
    let y = LEASE_BASE_YEAR + code as i32;
    if (LEASE_BASE_YEAR..=LEASE_LAST_YEAR).contains(&y) && code >= 0 {
        Some(y.to_string())
    } else {
        None
    }
}

fn reverse(table: &[&'static str]) -> HashMap<&'static str, i8> {
    table
        .iter()
        .enumerate()
        .map(|(i, s)| (*s, i as i8))
        .collect()
}

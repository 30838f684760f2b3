use colstore::dict;

#[test]
fn month_codes_are_contiguous_from_2014() {
    assert_eq!(dict::month_code("2014-01"), Some(0));
    assert_eq!(dict::month_code("2014-12"), Some(11));
    assert_eq!(dict::month_code("2015-01"), Some(12));
    assert_eq!(dict::month_code("2024-01"), Some(120));
}

#[test]
fn month_rejects_out_of_range_and_garbage() {
    assert_eq!(dict::month_code("2013-12"), None);
    assert_eq!(dict::month_code("2024-02"), None);
    assert_eq!(dict::month_code("2014-13"), None);
    assert_eq!(dict::month_code("2014-00"), None);
    assert_eq!(dict::month_code("2014"), None);
    assert_eq!(dict::month_code("14-01"), None);
    assert_eq!(dict::month_code("abcd-ef"), None);
}

#[test]
fn month_round_trips_every_code() {
    for code in 0..dict::MONTH_CODES {
        let name = dict::month_name(code).expect("in-range code");
        assert_eq!(dict::month_code(&name), Some(code), "code {code} -> {name}");
    }
    assert_eq!(dict::month_name(dict::MONTH_CODES), None);
    assert_eq!(dict::month_name(-1), None);
}

#[test]
fn town_round_trips_and_keeps_its_baked_in_order() {
    // ids are baked into existing artifacts; spot-check both ends
    assert_eq!(dict::town_code("BEDOK"), Some(0));
    assert_eq!(dict::town_code("YISHUN"), Some(9));
    assert_eq!(dict::town_code("ANG MO KIO"), Some(10));
    assert_eq!(dict::town_code("TOA PAYOH"), Some(25));
    for (i, town) in dict::TOWNS.iter().enumerate() {
        assert_eq!(dict::town_code(town), Some(i as i8));
        assert_eq!(dict::town_name(i as i8), Some(*town));
    }
    assert_eq!(dict::town_code("SINGAPORE"), None);
    assert_eq!(dict::town_name(26), None);
}

#[test]
fn flat_type_and_model_round_trip() {
    for (i, v) in dict::FLAT_TYPES.iter().enumerate() {
        assert_eq!(dict::flat_type_code(v), Some(i as i8));
        assert_eq!(dict::flat_type_name(i as i8), Some(*v));
    }
    for (i, v) in dict::FLAT_MODELS.iter().enumerate() {
        assert_eq!(dict::flat_model_code(v), Some(i as i8));
        assert_eq!(dict::flat_model_name(i as i8), Some(*v));
    }
    assert_eq!(dict::flat_type_code("6 ROOM"), None);
    assert_eq!(dict::flat_model_code("Penthouse"), None);
}

#[test]
fn storey_range_round_trips() {
    for (i, v) in dict::STOREY_RANGES.iter().enumerate() {
        assert_eq!(dict::storey_range_code(v), Some(i as i8));
        assert_eq!(dict::storey_range_name(i as i8), Some(*v));
    }
    assert_eq!(dict::storey_range_code("52 TO 54"), None);
}

#[test]
fn lease_commence_spans_1966_to_2022() {
    assert_eq!(dict::lease_commence_code("1966"), Some(0));
    assert_eq!(dict::lease_commence_code("2022"), Some(56));
    assert_eq!(dict::lease_commence_code("1965"), None);
    assert_eq!(dict::lease_commence_code("2023"), None);
    for code in 0..=56 {
        let year = dict::lease_commence_name(code).expect("in-range code");
        assert_eq!(dict::lease_commence_code(&year), Some(code));
    }
}

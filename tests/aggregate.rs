use colstore::query::aggregate::{AggKind, Aggregate};

#[test]
fn min_starts_at_infinity_and_tracks_the_smallest_value() {
    let min = Aggregate::new(AggKind::Min);
    assert_eq!(min.result(), f64::INFINITY);

    min.update(300.0);
    min.update(100.0);
    min.update(200.0);
    assert_eq!(min.result(), 100.0);
}

#[test]
fn avg_is_zero_over_no_rows() {
    let avg = Aggregate::new(AggKind::Avg);
    assert_eq!(avg.result(), 0.0);

    for v in [100.0, 200.0, 300.0, 400.0, 500.0] {
        avg.update(v);
    }
    assert_eq!(avg.result(), 300.0);
}

#[test]
fn stdev_is_population_form() {
    let stdev = Aggregate::new(AggKind::Stdev);
    assert_eq!(stdev.result(), 0.0);

    for v in [100.0, 200.0, 300.0, 400.0, 500.0] {
        stdev.update(v);
    }
    // population: sqrt(550000/5 - 300^2) = sqrt(20000)
    assert!((stdev.result() - 20000f64.sqrt()).abs() < 1e-9);
}

#[test]
fn stdev_of_identical_values_is_exactly_zero() {
    let stdev = Aggregate::new(AggKind::Stdev);
    for _ in 0..7 {
        stdev.update(500000.0);
    }
    assert_eq!(stdev.result(), 0.0);
}

#[test]
fn updates_merge_across_threads() {
    let min = Aggregate::new(AggKind::Min);
    let avg = Aggregate::new(AggKind::Avg);

    std::thread::scope(|scope| {
        let (min, avg) = (&min, &avg);
        for chunk in [[10.0, 20.0], [30.0, 40.0]] {
            scope.spawn(move || {
                for v in chunk {
                    min.update(v);
                    avg.update(v);
                }
            });
        }
    });

    assert_eq!(min.result(), 10.0);
    assert_eq!(avg.result(), 25.0);
}

use super::*;
use std::collections::BTreeSet;

fn sorted(mut pts: Vec<Point>) -> Vec<Point> {
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts
}

#[test]
fn keys_floor_including_negatives() {
    assert_eq!(band_key(0.0, 1.0), 0);
    assert_eq!(band_key(0.999, 1.0), 0);
    assert_eq!(band_key(1.0, 1.0), 1);
    assert_eq!(band_key(-0.001, 1.0), -1);
    assert_eq!(band_key(-1.0, 0.5), -2);
    // Saturating cast for absurd ratios.
    assert_eq!(band_key(1e300, 1e-300), i64::MAX);
}

#[test]
fn build_keeps_x_order_inside_bands() {
    let pts = sorted(vec![
        Point::new(3.0, 0.2),
        Point::new(0.0, 0.9),
        Point::new(1.0, 1.5),
        Point::new(2.0, 0.1),
        Point::new(-1.0, -0.5),
    ]);
    let index = BandIndex::build(&pts, 1.0);
    assert_eq!(index.len(), 5);
    assert_eq!(index.band_count(), 3);
    assert_eq!(index.keys().collect::<Vec<_>>(), vec![-1, 0, 1]);
    let band0 = index.band(0).unwrap();
    assert_eq!(band0.len(), 3);
    assert!(band0.windows(2).all(|w| pts[w[0]].x <= pts[w[1]].x));
    assert!(index.band(7).is_none());
    assert_eq!(index.key_span(), Some(KeyRange::new(-1, 1)));
    assert_eq!(index.count_in(KeyRange::new(0, 1)), 4);
    assert_eq!(index.key_of(Point::new(9.0, 1.2)), 1);
    assert_eq!(index.bounds(-1), (-1.0, 0.0));
}

#[test]
fn every_point_lands_in_exactly_one_band() {
    let pts = sorted(crate::validate::uniform_points(500, 10.0, 11));
    let index = BandIndex::build(&pts, 0.7);
    let mut seen: Vec<usize> = index.iter().flat_map(|(_, ids)| ids.iter().copied()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..pts.len()).collect::<Vec<_>>());
    for (key, ids) in index.iter() {
        for &id in ids {
            assert_eq!(index.key_of(pts[id]), key);
        }
    }
}

#[test]
fn empty_index() {
    let index = BandIndex::build(&[], 1.0);
    assert!(index.is_empty());
    assert_eq!(index.key_span(), None);
    assert_eq!(index.keys().count(), 0);
}

#[test]
fn key_range_width_does_not_overflow() {
    let r = KeyRange::new(i64::MIN, i64::MAX);
    assert_eq!(r.width(), 1i128 << 64);
    assert!(r.contains(0));
    assert_eq!(KeyRange::new(3, 2).width(), 0);
}

#[test]
fn scanner_window_and_monotonic_cursor() {
    let pts: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 0.0)).collect();
    let family: BTreeSet<usize> = (0..10).collect();
    let scanner = NeighborScanner::new(&pts, 1.5);
    let mut cursor = Cursor::default();

    let got: Vec<usize> = scanner.scan(&family, &mut cursor, pts[4]).collect();
    assert_eq!(got, vec![3, 4, 5]);
    assert_eq!(cursor, Cursor(3));

    let got: Vec<usize> = scanner.scan(&family, &mut cursor, pts[7]).collect();
    assert_eq!(got, vec![6, 7, 8]);
    assert_eq!(cursor, Cursor(6));

    // Inclusive on both ends.
    let scanner = NeighborScanner::new(&pts, 2.0);
    let mut cursor = Cursor::default();
    let got: Vec<usize> = scanner.scan(&family, &mut cursor, pts[5]).collect();
    assert_eq!(got, vec![3, 4, 5, 6, 7]);
}

#[test]
fn cursor_skips_ids_missing_from_the_family() {
    let pts: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 0.0)).collect();
    let mut family: BTreeSet<usize> = [1, 2, 8].into_iter().collect();
    let scanner = NeighborScanner::new(&pts, 1.0);
    let mut cursor = Cursor::default();
    assert_eq!(scanner.scan(&family, &mut cursor, pts[5]).count(), 0);
    assert_eq!(cursor, Cursor(3));
    // A late insertion to the right of the cursor is still found.
    family.insert(6);
    let got: Vec<usize> = scanner.scan(&family, &mut cursor, pts[7]).collect();
    assert_eq!(got, vec![6, 8]);
}

#[test]
fn promote_moves_isolated_to_grouped_once() {
    let mut band = BandState::default();
    band.classify(1, false);
    band.classify(2, true);
    assert!(band.promote(1));
    assert!(!band.promote(1));
    assert!(!band.promote(2));
    assert!(!band.promote(9));
    assert_eq!(band.grouped.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert!(band.isolated.is_empty());
    assert_eq!(band.classified(), 2);
}

#[test]
fn split_below_and_layered_lookup() {
    let mut own = BandStates::for_keys([0, 1, 2, 5]);
    let mut shared = own.split_below(2);
    assert_eq!(shared.keys().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(own.keys().collect::<Vec<_>>(), vec![2, 5]);

    shared.band_mut(1).unwrap().classify(7, true);
    own.band_mut(5).unwrap().classify(9, false);
    let mut store = Layered {
        own: &mut own,
        shared: &mut shared,
    };
    assert!(store.band_mut(1).unwrap().grouped.contains(&7));
    assert!(store.band_mut(5).unwrap().isolated.contains(&9));
    assert!(store.band_mut(3).is_none());
    store.band_mut(2).unwrap().frontier = 4;
    assert_eq!(own.get(2).unwrap().frontier, 4);
}

use std::time::Instant;

use approx::assert_relative_eq;
use geo::{Coord, LineString, Polygon, coord};
use geosketch::{
    draw::{DrawMode, DrawPlugin},
    feature::{Feature, FeatureCollection, FeatureId, GeometryKind, Shape},
    stats::{FeatureCounts, FeatureStats},
    toolbar::ToolbarCommand,
    visibility::layer_id,
};

mod common;

#[test]
fn counts_add_up_to_the_feature_count() {
    let (board, mut editor) = common::setup();

    assert!(editor.process(&board, Instant::now()));

    let stats = editor.stats();
    assert_eq!(
        stats.counts,
        FeatureCounts {
            points: 2,
            lines: 1,
            polygons: 1
        }
    );
    assert_eq!(stats.counts.total(), board.features().len());
    for kind in GeometryKind::ALL {
        assert_eq!(
            stats.counts.get(kind),
            board.features().of_kind(kind).count(),
            "{kind}"
        );
    }
}

#[test]
fn recomputing_is_idempotent() {
    let (board, mut editor) = common::setup();
    let now = Instant::now();

    editor.recompute(&board, now);
    let first = editor.stats().clone();
    editor.recompute(&board, now);

    assert_eq!(editor.stats(), &first);
    assert_eq!(
        editor
            .sources()
            .get(layer_id::POLYGON_LABELS)
            .unwrap()
            .revision(),
        2
    );
}

#[test]
fn unit_meridian_line_is_one_segment() {
    let (board, mut editor) = common::setup();
    editor.process(&board, Instant::now());

    let stats = editor.stats();
    assert_eq!(stats.line_labels.len(), 1);
    assert_relative_eq!(stats.total_distance_km, 111.2, epsilon = 0.01);
    assert_eq!(stats.line_labels[0].text, "111.20 km");
}

#[test]
fn empty_ring_is_left_out_of_the_area() {
    let (mut board, mut editor) = common::setup();
    let now = Instant::now();
    editor.process(&board, now);
    let area = editor.stats().total_area_m2;

    let mut collection = common::sample_collection().into_features();
    collection.push(Feature::new(
        FeatureId::new(99),
        Shape::Polygon(Polygon::new(LineString::new(vec![]), vec![])),
    ));
    board.load(FeatureCollection::new(collection));
    editor.process(&board, now);

    let stats = editor.stats();
    assert_eq!(stats.total_area_m2, area);
    assert_eq!(stats.counts.polygons, 2);
    assert_eq!(stats.skipped_polygons, 1);
    assert_eq!(stats.polygon_labels.len(), 1);
}

#[test]
fn switching_modes_keeps_counts() {
    let (mut board, mut editor) = common::setup();
    let now = Instant::now();
    editor.process(&board, now);
    let counts = editor.stats().counts;

    for command in [
        ToolbarCommand::DrawPoint,
        ToolbarCommand::DrawLine,
        ToolbarCommand::DrawPolygon,
        ToolbarCommand::DrawPoint,
    ] {
        command.execute(&mut board);
        assert!(command.is_active(board.mode()));
        editor.process(&board, now);
        assert_eq!(editor.stats().counts, counts);
    }
}

#[test]
fn delete_command_removes_the_selection() {
    let (mut board, mut editor) = common::setup();

    board.click(coord! { x: 106.8272, y: -6.1754 }, common::TOLERANCE);
    assert_eq!(board.selection().len(), 1);

    ToolbarCommand::Delete.execute(&mut board);
    editor.process(&board, Instant::now());

    assert_eq!(editor.stats().counts.points, 1);
    assert!(board.selection().is_empty());
}

#[test]
fn drawing_a_polygon_publishes_an_area_label() {
    let (mut board, mut editor) = common::setup();
    let now = Instant::now();

    let vertices: [Coord; 3] = [
        coord! { x: 10.0, y: 10.0 },
        coord! { x: 10.02, y: 10.0 },
        coord! { x: 10.02, y: 10.02 },
    ];
    common::draw(&mut board, DrawMode::DrawPolygon, &vertices);
    editor.process(&board, now);

    let stats = editor.stats();
    assert_eq!(stats.counts.polygons, 2);
    assert_eq!(board.mode(), DrawMode::Idle);

    let labels = editor
        .sources()
        .get(layer_id::POLYGON_LABELS)
        .unwrap()
        .labels();
    assert_eq!(labels.len(), 2);
    assert!(labels[1].text.ends_with(" km²"), "{}", labels[1].text);
    assert_eq!(labels[1].feature, board.selection().first().copied());
}

#[test]
fn exported_features_load_back() {
    let (board, _) = common::setup();
    let exported = board.features().to_geojson().unwrap();

    let imported = FeatureCollection::from_geojson(&exported).unwrap();

    assert_eq!(imported.len(), 4);
    for (before, after) in board.features().iter().zip(imported.iter()) {
        assert_eq!(before.shape(), after.shape());
        assert_eq!(before.properties(), after.properties());
    }
    assert_eq!(
        FeatureStats::compute(&imported).counts,
        FeatureStats::compute(&board.features()).counts
    );
}

use std::{fs, path::PathBuf};

use geo::Coord;
use geosketch::{
    config::EditorConfig,
    draw::{DrawMode, DrawPlugin},
    editor::Editor,
    feature::FeatureCollection,
    sketch::SketchBoard,
};

pub const TOLERANCE: f64 = 0.01;

pub fn sample_collection() -> FeatureCollection {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources/sample.geojson");
    let content = fs::read_to_string(path).unwrap();

    FeatureCollection::from_geojson(&content).unwrap()
}

/// Board loaded with the sample collection and an attached editor.
pub fn setup() -> (SketchBoard, Editor) {
    let editor = Editor::new(EditorConfig::default());
    let mut board = SketchBoard::new();
    editor.attach(&mut board);
    board.load(sample_collection());

    (board, editor)
}

pub fn draw(board: &mut SketchBoard, mode: DrawMode, vertices: &[Coord]) {
    board.set_mode(mode);
    for vertex in vertices {
        board.click(*vertex, TOLERANCE);
    }
    if board.is_sketching() {
        board.finish();
    }
}

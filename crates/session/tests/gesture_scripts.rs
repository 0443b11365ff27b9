use std::path::PathBuf;

use kenburns_geometry::{AspectRatio, DisplaySurface, Rect, Size};
use kenburns_session::{parse_gestures, BoxId, PointerGesture, ReplayReport, Session};

fn load_fixture(name: &str) -> Vec<PointerGesture> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("gestures")
        .join(name);

    let content = std::fs::read_to_string(path).expect("gesture fixture should be readable");
    parse_gestures(&content).expect("gesture fixture should parse")
}

fn hd_session(aspect_lock: Option<AspectRatio>) -> Session {
    let mut session = Session::new(DisplaySurface::at_origin(Size::new(960, 540)))
        .with_aspect_lock(aspect_lock);
    session
        .load_image(Size::new(1920, 1080))
        .expect("image should fit");
    session
}

#[test]
fn pan_to_corner_produces_filter_parameters() {
    let gestures = load_fixture("pan-to-corner.jsonl");
    let mut session = hd_session(None);

    let report = ReplayReport::replay(&mut session, &gestures).expect("script should replay");
    assert_eq!(report.applied, 8);
    assert_eq!(report.ignored, 1);
    assert_eq!(report.completed.len(), 2);

    // The release past the corner sticks to the last column and the bottom edge.
    assert_eq!(
        session.rectangle_for(BoxId::End),
        Some(Rect::new(720, 405, 239, 135))
    );

    let params = session.to_filter_parameters(5.0).expect("selection is complete");
    assert_eq!(params.start_rect(), Rect::new(0, 0, 960, 540));
    assert_eq!(params.end_rect(), Rect::new(1440, 810, 478, 270));

    let trajectory = params.trajectory(30).expect("trajectory");
    assert_eq!(trajectory.frames(), 150);
    let first = trajectory.window(0);
    assert_eq!((first.x, first.y), (0.0, 0.0));
    let last = trajectory.final_window();
    assert!((last.x - 1440.0).abs() < 1e-9);
    assert!((last.y - 810.0).abs() < 1e-9);
}

#[test]
fn aspect_locked_script_keeps_widescreen_boxes() {
    let gestures = load_fixture("aspect-locked.jsonl");
    let mut session = hd_session(Some(AspectRatio::WIDESCREEN));

    let report = ReplayReport::replay(&mut session, &gestures).expect("script should replay");
    assert_eq!(report.completed.len(), 2);
    assert_eq!(report.completed[0].display_rect, Rect::new(0, 0, 89, 50));
    assert_eq!(report.completed[1].display_rect, Rect::new(240, 100, 160, 90));
    assert_eq!(report.completed[1].image_rect, Rect::new(480, 200, 320, 180));

    for done in &report.completed {
        let aspect = done.display_rect.aspect().expect("non-empty");
        assert!((aspect - 16.0 / 9.0).abs() < 0.02, "{:?}", done.display_rect);
    }
}

#[test]
fn redraw_script_replaces_start_box() {
    let gestures = load_fixture("redraw.jsonl");
    let mut session = hd_session(None);

    let report = ReplayReport::replay(&mut session, &gestures).expect("script should replay");
    assert_eq!(report.completed.len(), 3);
    assert_eq!(
        report.completed.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![BoxId::Start, BoxId::Start, BoxId::End]
    );
    assert_eq!(
        session.image_rectangle_for(BoxId::Start),
        Some(Rect::new(100, 100, 640, 360))
    );
    assert_eq!(
        session.image_rectangle_for(BoxId::End),
        Some(Rect::new(1000, 600, 320, 180))
    );
}

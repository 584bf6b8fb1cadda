use std::io::Write;

use tempfile::NamedTempFile;

use backend::cv::{replay::ReplaySource, CameraConfig, CameraSource, Detector, ThresholdDetector};
use backend::error::Error;
use backend::geometry::BoundingBox;

fn replay_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp replay");
    file.write_all(contents.as_bytes()).expect("write replay");
    file
}

#[test]
fn replays_frames_in_order() {
    let file = replay_file(
        r#"[{"class_id": 1, "score": 0.9, "bounding_box": [700, 500, 240, 232]}]

[]
[{"class_id": 2, "bounding_box": [1, 2, 3, 4]}, {"class_id": 3, "score": 0.2, "bounding_box": [5, 6, 7, 8]}]
"#,
    );
    let mut source = ReplaySource::open(file.path(), CameraConfig::default()).unwrap();
    assert_eq!(source.resolution(), CameraConfig::default().resolution);

    let first = source.next_result().unwrap().unwrap();
    assert_eq!(first.0.len(), 1);
    assert_eq!(first.0[0].bounding_box, BoundingBox::new(700, 500, 240, 232));

    let second = source.next_result().unwrap().unwrap();
    assert!(second.0.is_empty());

    let third = source.next_result().unwrap().unwrap();
    let kept = ThresholdDetector.get_objects(&third, 0.3).unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].class_id, 2);

    assert!(source.next_result().unwrap().is_none());
}

#[test]
fn malformed_line_reports_its_number() {
    let file = replay_file("[]\n\n[{\"class_id\": 1}]\n");
    let mut source = ReplaySource::open(file.path(), CameraConfig::default()).unwrap();

    assert!(source.next_result().unwrap().is_some());
    match source.next_result() {
        Err(Error::Replay { line, path, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(path, file.path());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ReplaySource::open(dir.path().join("absent.jsonl"), CameraConfig::default());
    assert!(matches!(result, Err(Error::Io(_))));
}

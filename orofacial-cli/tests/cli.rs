use image::{GrayImage, Luma, Rgb};
use std::process::Command;
use tempfile::TempDir;

fn orofacial() -> Command {
    Command::new(env!("CARGO_BIN_EXE_orofacial"))
}

#[test]
fn test_tip_command_prints_coordinates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mask.png");
    // Bar at x in 4..24, y in 2..6; speck at (30, 10) removed by cleanup.
    GrayImage::from_fn(32, 12, |x, y| {
        let bar = (4..24).contains(&x) && (2..6).contains(&y);
        Luma([if bar || (x, y) == (30, 10) { 255 } else { 0 }])
    })
    .save(&path)
    .unwrap();

    let output = orofacial()
        .args(["tip", "--hint-x", "1", "--hint-y", "0", "--largest-component", "--detail"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let fields: Vec<&str> = stdout.split_whitespace().collect();
    assert_eq!(fields.len(), 3);
    let x: f64 = fields[0].parse().unwrap();
    let y: f64 = fields[1].parse().unwrap();
    assert!((20.0..=23.0).contains(&x), "x {}", x);
    assert!((y - 3.5).abs() < 1e-9, "y {}", y);
    assert_eq!(fields[2], "boundary_tip");
}

#[test]
fn test_tip_command_empty_mask_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blank.png");
    GrayImage::new(8, 8).save(&path).unwrap();

    let output = orofacial().arg("tip").arg(&path).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_jaw_command() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("jaw_bottom_1.json");
    std::fs::write(
        &input,
        r#"[{"image": "img00003.png", "labels": {"jaw": [10, 20]}}]"#,
    )
    .unwrap();

    let status = orofacial().arg("jaw").arg(&input).status().unwrap();
    assert!(status.success());

    let csv = std::fs::read_to_string(dir.path().join("jaw_bottom_1.csv")).unwrap();
    assert_eq!(csv, "Frame X Y Probability\n3 20 10 1.00\n");
}

fn write_bar(path: &std::path::Path) {
    // 20x4 bar at x in 5..25, y in 3..7.
    GrayImage::from_fn(30, 10, |x, y| {
        let bar = (5..25).contains(&x) && (3..7).contains(&y);
        Luma([if bar { 255 } else { 0 }])
    })
    .save(path)
    .unwrap();
}

fn tip_output(args: &[&str], path: &std::path::Path) -> Vec<f64> {
    let output = orofacial().args(args).arg(path).output().unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout)
        .unwrap()
        .split_whitespace()
        .map(|field| field.parse().unwrap())
        .collect()
}

#[test]
fn test_tip_command_integer_cutoff() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bar.png");
    write_bar(&path);

    let exact = tip_output(&["tip", "--hint-x", "1"], &path);
    let truncated = tip_output(&["tip", "--hint-x", "1", "--integer-cutoff"], &path);
    assert!((exact[0] - (24.0 - 1.0 / 3.0)).abs() < 1e-9);
    assert!((truncated[0] - 23.25).abs() < 1e-9);
    assert!((truncated[1] - 4.5).abs() < 1e-9);
}

#[test]
fn test_tip_command_writes_overlay() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bar.png");
    let overlay = dir.path().join("overlay.png");
    write_bar(&path);

    let status = orofacial()
        .args(["tip", "--hint-x", "1", "--overlay"])
        .arg(&overlay)
        .arg(&path)
        .status()
        .unwrap();
    assert!(status.success());

    let image = image::open(&overlay).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (30, 10));
    // Tip rounds to (24, 5).
    assert_eq!(*image.get_pixel(24, 5), Rgb([255, 0, 0]));
    assert_eq!(*image.get_pixel(10, 4), Rgb([255, 255, 255]));
    assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 0]));
}

#[cfg(feature = "hdf5")]
#[test]
fn test_track_command_uses_frame_numbers() {
    use orofacial_core::{Pixel, PointSet};

    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("tongue.h5");
    let csv = dir.path().join("tips.csv");

    let bar: PointSet = (3..7)
        .flat_map(|y| (5..25).map(move |x| Pixel::new(x, y)))
        .collect();
    let outside: PointSet = [Pixel::new(50, 2)].into_iter().collect();
    let frames = vec![bar.clone(), outside, PointSet::default(), bar];
    orofacial_io::write_tongue_archive_with(&archive, &frames, Some(&[198, 199, 200, 204]), None)
        .unwrap();

    let status = orofacial()
        .args(["track", "--height", "10", "--width", "30", "--hint-x", "1", "--chunk-size", "3"])
        .arg(&archive)
        .arg("--output")
        .arg(&csv)
        .status()
        .unwrap();
    assert!(status.success());

    let content = std::fs::read_to_string(&csv).unwrap();
    let rows: Vec<&str> = content.lines().collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0], "frame,x,y,stage");
    assert!(rows[1].starts_with("198,"));
    assert!(rows[1].ends_with(",4.5,boundary_tip"));
    // Pixel outside the requested extent: error row, run continues.
    assert_eq!(rows[2], "199,,,error");
    assert_eq!(rows[3], "200,,,error");
    assert!(rows[4].starts_with("204,"));
}

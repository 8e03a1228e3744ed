use std::path::PathBuf;
use std::process::Command;

use blur_hdri::{read, write, Raster};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn panorama(width: u32, height: u32) -> Raster {
    let row: Vec<u8> = (0..width)
        .flat_map(|x| if x < width / 2 { [255, 0, 0] } else { [0, 0, 255] })
        .collect();
    let data = row.repeat(height as usize);
    Raster::from_u8(width, height, ["R", "G", "B"], data).unwrap()
}

#[test]
fn cli_writes_blurred_sibling() {
    let dir = scratch_dir("cli_smoke_default");
    let input = dir.join("sky.png");
    write(&input, &panorama(32, 8), None).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_blur-hdri"))
        .arg(&input)
        .args(["--radius", "2"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let written = dir.join("sky_blurred.png");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        written.display().to_string()
    );
    let blurred = read(&written).unwrap().raster;
    assert!(blurred.sample(0, 4, 2).unwrap() > 10.0);
}

#[test]
fn cli_rejects_radius_out_of_range() {
    let dir = scratch_dir("cli_smoke_radius");
    let input = dir.join("sky.png");
    write(&input, &panorama(8, 2), None).unwrap();

    for radius in ["0.05", "150"] {
        let status = Command::new(env!("CARGO_BIN_EXE_blur-hdri"))
            .arg(&input)
            .args(["--radius", radius])
            .output()
            .unwrap()
            .status;
        assert!(!status.success(), "radius {radius} accepted");
    }
    assert!(!dir.join("sky_blurred.png").exists());
}

#[test]
fn cli_honours_output_and_kind() {
    let dir = scratch_dir("cli_smoke_output");
    let input = dir.join("wood.png");
    let target = dir.join("wood_soft.png");
    write(&input, &panorama(16, 4), None).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_blur-hdri"))
        .arg(&input)
        .args(["--kind", "image", "--radius", "1", "--output"])
        .arg(&target)
        .status()
        .unwrap();
    assert!(status.success());

    // a flat texture keeps pure red at the left edge
    let blurred = read(&target).unwrap().raster;
    assert!(blurred.sample(0, 2, 0).unwrap() >= 250.0);
}

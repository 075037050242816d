use super::*;

#[test]
fn config_validation_catches_bad_values() {
    assert!(
        EncodeConfig {
            width: 0,
            height: 10,
            fps: 30,
            out_path: PathBuf::from("out.mp4"),
            overwrite: true,
        }
        .validate()
        .is_err()
    );

    assert!(
        EncodeConfig {
            width: 11,
            height: 10,
            fps: 30,
            out_path: PathBuf::from("out.mp4"),
            overwrite: true,
        }
        .validate()
        .is_err()
    );

    assert!(
        EncodeConfig {
            width: 10,
            height: 10,
            fps: 0,
            out_path: PathBuf::from("out.mp4"),
            overwrite: true,
        }
        .validate()
        .is_err()
    );

    assert!(
        EncodeConfig {
            width: 1080,
            height: 1920,
            fps: 30,
            out_path: PathBuf::from("out.mp4"),
            overwrite: true,
        }
        .validate()
        .is_ok()
    );
}

#[test]
fn flatten_premul_over_black_produces_expected_rgb() {
    // Premultiplied red @ 50% alpha => rgb is 128,0,0 when premul.
    let src = vec![128u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_straight_over_black_produces_expected_rgb() {
    // Straight red @ 50% alpha => rgb becomes 128,0,0 over black.
    let src = vec![255u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_blends_against_the_chart_background() {
    // Fully transparent pixel takes the background color unchanged.
    let src = vec![0u8, 0u8, 0u8, 0u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [0x21, 0x21, 0x21, 255]).unwrap();
    assert_eq!(dst, vec![0x21, 0x21, 0x21, 255u8]);
}

#[test]
fn flatten_passes_opaque_pixels_through() {
    let src = vec![10u8, 20u8, 30u8, 255u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [99, 99, 99, 255]).unwrap();
    assert_eq!(dst, vec![10u8, 20u8, 30u8, 255u8]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let src = vec![0u8; 8];
    let mut dst = vec![0u8; 4];
    assert!(flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).is_err());
}
